use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::{decode, fetch_page};
use crate::database::{DocumentStore, StoreError};
use crate::models::product::{COLLECTION, Product};

/// 商品存储库
#[derive(Clone)]
pub struct ProductRepository {
    store: Arc<dyn DocumentStore>,
}

impl ProductRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn create(
        &self,
        title: String,
        text: String,
        short_text: String,
        img: Option<String>,
    ) -> Result<Product, StoreError> {
        let product = Product {
            id: Uuid::new_v4(),
            title,
            text,
            short_text,
            img,
            date: Utc::now(),
        };

        self.store
            .insert(COLLECTION, product.id, serde_json::to_value(&product)?)
            .await?;

        tracing::info!("Product created: {}", product.id);
        Ok(product)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, StoreError> {
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
    ) -> Result<(Vec<Product>, u64), StoreError> {
        fetch_page(self.store.as_ref(), COLLECTION, page_number, page_size).await
    }

    pub async fn patch(
        &self,
        id: Uuid,
        fields: Map<String, Value>,
    ) -> Result<Option<Product>, StoreError> {
        let updated = self
            .store
            .update_fields(COLLECTION, id, fields)
            .await?
            .map(decode)
            .transpose()?;

        match &updated {
            Some(_) => tracing::info!("Product updated: {}", id),
            None => tracing::warn!("Product not found for update: {}", id),
        }
        Ok(updated)
    }

    pub async fn remove(&self, id: Uuid) -> Result<bool, StoreError> {
        let removed = self.store.delete(COLLECTION, id).await?;
        tracing::info!(removed, "Product delete requested: {}", id);
        Ok(removed)
    }
}
