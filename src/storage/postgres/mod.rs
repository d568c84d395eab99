//! PostgreSQL document store
//!
//! Suitable for production deployments. Payloads are stored as JSONB.

use crate::errors::StorageError;
use crate::storage::traits::{DocumentStore, IdentityHandle, Result, require_object};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::Row;
use sqlx::postgres::PgPool;

/// PostgreSQL implementation of [`DocumentStore`]
pub struct PostgresDocumentStore {
    pool: PgPool,
}

impl PostgresDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations/postgres")
            .run(&self.pool)
            .await
            .map_err(|e| StorageError::DatabaseError(format!("Migration failed: {}", e)))?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for PostgresDocumentStore {
    async fn create_document(
        &self,
        collection: &str,
        owner: &IdentityHandle,
        payload: &Value,
    ) -> Result<()> {
        require_object(payload)?;

        sqlx::query("INSERT INTO documents (collection, id, payload) VALUES ($1, $2, $3)")
            .bind(collection)
            .bind(&owner.uid)
            .bind(sqlx::types::Json(payload))
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    StorageError::AlreadyExists(format!("{}/{}", collection, owner.uid))
                }
                e => StorageError::QueryFailed(format!("Failed to insert document: {}", e)),
            })?;

        Ok(())
    }

    async fn get_document(
        &self,
        collection: &str,
        owner: &IdentityHandle,
    ) -> Result<Option<Value>> {
        let row = sqlx::query("SELECT payload FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(&owner.uid)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::QueryFailed(format!("Failed to get document: {}", e)))?;

        row.map(|row| {
            row.try_get::<sqlx::types::Json<Value>, _>("payload")
                .map(|payload| payload.0)
                .map_err(|e| StorageError::DatabaseError(format!("Failed to get payload: {}", e)))
        })
        .transpose()
    }
}
