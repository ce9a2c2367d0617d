use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use super::{decode, fetch_page};
use crate::database::{DocumentStore, StoreError};
use crate::models::user::{COLLECTION, UserDocument};

/// 用户存储库
#[derive(Clone)]
pub struct UserRepository {
    store: Arc<dyn DocumentStore>,
}

impl UserRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// 创建管理员，邮箱已存在时返回 `StoreError::Duplicate`
    pub async fn create_admin(
        &self,
        email: String,
        phone: String,
        password_hash: String,
    ) -> Result<UserDocument, StoreError> {
        if self.find_by_email(&email).await?.is_some() {
            tracing::warn!("User already exists: {}", email);
            return Err(StoreError::Duplicate);
        }

        let now = Utc::now();
        let user = UserDocument {
            id: Uuid::new_v4(),
            email,
            phone,
            is_admin: true,
            password: password_hash,
            created_at: now,
            updated_at: now,
        };

        self.store
            .insert(COLLECTION, user.id, serde_json::to_value(&user)?)
            .await?;

        tracing::info!("Admin created: {}", user.id);
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserDocument>, StoreError> {
        self.store
            .find_one_by_field(COLLECTION, "email", email)
            .await?
            .map(decode)
            .transpose()
    }

    pub async fn find_page(
        &self,
        page_number: u64,
        page_size: u64,
    ) -> Result<(Vec<UserDocument>, u64), StoreError> {
        fetch_page(self.store.as_ref(), COLLECTION, page_number, page_size).await
    }

    pub async fn remove(&self, id: Uuid) -> Result<bool, StoreError> {
        let removed = self.store.delete(COLLECTION, id).await?;
        tracing::info!(removed, "User delete requested: {}", id);
        Ok(removed)
    }
}
