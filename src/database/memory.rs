use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::{DocumentStore, StoreError};
use crate::models::user;

// 与 PostgreSQL 中的唯一索引保持一致
const UNIQUE_FIELDS: &[(&str, &str)] = &[(user::COLLECTION, "email")];

fn violates_unique(collection: &str, docs: &[(Uuid, Value)], doc: &Value) -> bool {
    UNIQUE_FIELDS
        .iter()
        .filter(|(c, _)| *c == collection)
        .any(|(_, field)| {
            let Some(value) = doc.get(*field).and_then(Value::as_str) else {
                return false;
            };
            docs.iter()
                .any(|(_, existing)| existing.get(*field).and_then(Value::as_str) == Some(value))
        })
}

/// 进程内文档存储，未配置数据库时以及测试中使用
#[derive(Default)]
pub struct MemoryDocumentStore {
    // 每个集合按插入顺序保存
    collections: RwLock<HashMap<String, Vec<(Uuid, Value)>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn insert(&self, collection: &str, id: Uuid, doc: Value) -> Result<(), StoreError> {
        let mut collections = self.collections.write();
        let docs = collections.entry(collection.to_owned()).or_default();
        if docs.iter().any(|(existing, _)| *existing == id)
            || violates_unique(collection, docs, &doc)
        {
            return Err(StoreError::Duplicate);
        }
        docs.push((id, doc));
        Ok(())
    }

    async fn find_by_id(&self, collection: &str, id: Uuid) -> Result<Option<Value>, StoreError> {
        let collections = self.collections.read();
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|(existing, _)| *existing == id))
            .map(|(_, doc)| doc.clone()))
    }

    async fn find_one_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Option<Value>, StoreError> {
        let collections = self.collections.read();
        Ok(collections
            .get(collection)
            .and_then(|docs| {
                docs.iter()
                    .find(|(_, doc)| doc.get(field).and_then(Value::as_str) == Some(value))
            })
            .map(|(_, doc)| doc.clone()))
    }

    async fn update_fields(
        &self,
        collection: &str,
        id: Uuid,
        fields: Map<String, Value>,
    ) -> Result<Option<Value>, StoreError> {
        let mut collections = self.collections.write();
        let Some(doc) = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|(existing, _)| *existing == id))
            .map(|(_, doc)| doc)
        else {
            return Ok(None);
        };

        if let Value::Object(target) = &mut *doc {
            target.extend(fields);
        }
        Ok(Some(doc.clone()))
    }

    async fn delete(&self, collection: &str, id: Uuid) -> Result<bool, StoreError> {
        let mut collections = self.collections.write();
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(false);
        };
        let before = docs.len();
        docs.retain(|(existing, _)| *existing != id);
        Ok(docs.len() != before)
    }

    async fn count(&self, collection: &str) -> Result<u64, StoreError> {
        let collections = self.collections.read();
        Ok(collections.get(collection).map_or(0, |docs| docs.len() as u64))
    }

    async fn find_page(
        &self,
        collection: &str,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Value>, StoreError> {
        let collections = self.collections.read();
        let Some(docs) = collections.get(collection) else {
            return Ok(Vec::new());
        };
        Ok(docs
            .iter()
            .rev()
            .skip(skip as usize)
            .take(limit as usize)
            .map(|(_, doc)| doc.clone())
            .collect())
    }
}
