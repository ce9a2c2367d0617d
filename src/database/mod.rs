// 文档存储模块
// 以集合为单位保存 JSON 文档，具体实现为 PostgreSQL(JSONB) 或内存存储

pub mod memory;
pub mod postgres;
pub mod repositories;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document violates a unique constraint")]
    Duplicate,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("malformed document: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// 文档存储接口
///
/// 所有文档以 `id` 为主键，分页查询按插入时间倒序返回。
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert(&self, collection: &str, id: Uuid, doc: Value) -> Result<(), StoreError>;

    async fn find_by_id(&self, collection: &str, id: Uuid) -> Result<Option<Value>, StoreError>;

    /// 按顶层字符串字段精确匹配，返回第一条
    async fn find_one_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Option<Value>, StoreError>;

    /// 浅合并字段（等价于 `$set`），文档不存在时返回 `None`
    async fn update_fields(
        &self,
        collection: &str,
        id: Uuid,
        fields: Map<String, Value>,
    ) -> Result<Option<Value>, StoreError>;

    async fn delete(&self, collection: &str, id: Uuid) -> Result<bool, StoreError>;

    async fn count(&self, collection: &str) -> Result<u64, StoreError>;

    async fn find_page(
        &self,
        collection: &str,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Value>, StoreError>;
}
