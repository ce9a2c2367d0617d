use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::{decode, fetch_page};
use crate::database::{DocumentStore, StoreError};
use crate::models::article::{Article, COLLECTION};

/// 文章存储库
#[derive(Clone)]
pub struct ArticleRepository {
    store: Arc<dyn DocumentStore>,
}

impl ArticleRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn create(
        &self,
        title: String,
        text: String,
        img: Option<String>,
    ) -> Result<Article, StoreError> {
        let article = Article {
            id: Uuid::new_v4(),
            title,
            text,
            img,
            date: Utc::now(),
        };

        self.store
            .insert(COLLECTION, article.id, serde_json::to_value(&article)?)
            .await?;

        tracing::info!("Article created: {}", article.id);
        Ok(article)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Article>, StoreError> {
        self.store
            .find_by_id(COLLECTION, id)
            .await?
            .map(decode)
            .transpose()
    }

    pub async fn find_page(
        &self,
        page_number: u64,
        page_size: u64,
    ) -> Result<(Vec<Article>, u64), StoreError> {
        fetch_page(self.store.as_ref(), COLLECTION, page_number, page_size).await
    }

    pub async fn patch(
        &self,
        id: Uuid,
        fields: Map<String, Value>,
    ) -> Result<Option<Article>, StoreError> {
        let updated = self
            .store
            .update_fields(COLLECTION, id, fields)
            .await?
            .map(decode)
            .transpose()?;

        match &updated {
            Some(_) => tracing::info!("Article updated: {}", id),
            None => tracing::warn!("Article not found for update: {}", id),
        }
        Ok(updated)
    }

    pub async fn remove(&self, id: Uuid) -> Result<bool, StoreError> {
        let removed = self.store.delete(COLLECTION, id).await?;
        tracing::info!(removed, "Article delete requested: {}", id);
        Ok(removed)
    }
}
