use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;
use sqlx::Executor;
use uuid::Uuid;

use super::{DocumentStore, StoreError};

/// 基于 PostgreSQL JSONB 的文档存储
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .after_connect(|conn, _meta| {
                Box::pin(async move {
                    conn.execute("SET application_name = 'edjr_backend';")
                        .await?;
                    Ok(())
                })
            })
            .connect(database_url)
            .await?;

        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                collection TEXT NOT NULL,
                id UUID NOT NULL,
                body JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                PRIMARY KEY (collection, id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // 用户邮箱唯一
        sqlx::query(
            r#"
            CREATE UNIQUE INDEX IF NOT EXISTS unique_email_index
            ON documents ((body->>'email'))
            WHERE collection = 'users'
            "#,
        )
        .execute(&self.pool)
        .await?;

        tracing::info!("Document store schema is ready");
        Ok(())
    }
}

fn map_insert_error(e: sqlx::Error) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Duplicate,
        _ => StoreError::Database(e),
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn insert(&self, collection: &str, id: Uuid, doc: Value) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO documents (collection, id, body) VALUES ($1, $2, $3)")
            .bind(collection)
            .bind(id)
            .bind(Json(doc))
            .execute(&self.pool)
            .await
            .map_err(map_insert_error)?;
        Ok(())
    }

    async fn find_by_id(&self, collection: &str, id: Uuid) -> Result<Option<Value>, StoreError> {
        let doc = sqlx::query_scalar::<_, Json<Value>>(
            "SELECT body FROM documents WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(doc.map(|Json(v)| v))
    }

    async fn find_one_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Option<Value>, StoreError> {
        let doc = sqlx::query_scalar::<_, Json<Value>>(
            r#"
            SELECT body FROM documents
            WHERE collection = $1 AND body->>$2 = $3
            ORDER BY created_at
            LIMIT 1
            "#,
        )
        .bind(collection)
        .bind(field)
        .bind(value)
        .fetch_optional(&self.pool)
        .await?;

        Ok(doc.map(|Json(v)| v))
    }

    async fn update_fields(
        &self,
        collection: &str,
        id: Uuid,
        fields: Map<String, Value>,
    ) -> Result<Option<Value>, StoreError> {
        let doc = sqlx::query_scalar::<_, Json<Value>>(
            r#"
            UPDATE documents
            SET body = body || $3
            WHERE collection = $1 AND id = $2
            RETURNING body
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(Json(Value::Object(fields)))
        .fetch_optional(&self.pool)
        .await
        .map_err(map_insert_error)?;

        Ok(doc.map(|Json(v)| v))
    }

    async fn delete(&self, collection: &str, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self, collection: &str) -> Result<u64, StoreError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM documents WHERE collection = $1")
                .bind(collection)
                .fetch_one(&self.pool)
                .await?;

        Ok(count.max(0) as u64)
    }

    async fn find_page(
        &self,
        collection: &str,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Value>, StoreError> {
        let docs = sqlx::query_scalar::<_, Json<Value>>(
            r#"
            SELECT body FROM documents
            WHERE collection = $1
            ORDER BY created_at DESC
            OFFSET $2
            LIMIT $3
            "#,
        )
        .bind(collection)
        .bind(i64::try_from(skip).unwrap_or(i64::MAX))
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        Ok(docs.into_iter().map(|Json(v)| v).collect())
    }
}
