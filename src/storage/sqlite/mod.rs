//! SQLite document store
//!
//! Suitable for single-instance deployments and development. Payloads are
//! stored as JSON text.

use crate::errors::StorageError;
use crate::storage::traits::{DocumentStore, IdentityHandle, Result, require_object};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::Row;
use sqlx::sqlite::SqlitePool;

/// SQLite implementation of [`DocumentStore`]
pub struct SqliteDocumentStore {
    pool: SqlitePool,
}

impl SqliteDocumentStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations/sqlite")
            .run(&self.pool)
            .await
            .map_err(|e| StorageError::DatabaseError(format!("Migration failed: {}", e)))?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn create_document(
        &self,
        collection: &str,
        owner: &IdentityHandle,
        payload: &Value,
    ) -> Result<()> {
        require_object(payload)?;
        let payload_json = serde_json::to_string(payload)
            .map_err(|e| StorageError::SerializationFailed(e.to_string()))?;

        sqlx::query(
            "INSERT INTO documents (collection, id, payload, created_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(collection)
        .bind(&owner.uid)
        .bind(payload_json)
        .bind(Utc::now().to_rfc3339())
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
        let row = sqlx::query("SELECT payload FROM documents WHERE collection = ?1 AND id = ?2")
            .bind(collection)
            .bind(&owner.uid)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::QueryFailed(format!("Failed to get document: {}", e)))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let payload_json: String = row
            .try_get("payload")
            .map_err(|e| StorageError::DatabaseError(format!("Failed to get payload: {}", e)))?;
        let payload = serde_json::from_str(&payload_json)
            .map_err(|e| StorageError::SerializationFailed(e.to_string()))?;
        Ok(Some(payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn store() -> SqliteDocumentStore {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        let store = SqliteDocumentStore::new(pool);
        store.migrate().await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let store = store().await;
        let owner = IdentityHandle::new("uid-1");
        let payload = json!({"nombres": "Ana", "estado": "pendiente"});

        store.create_document("usuarios", &owner, &payload).await.unwrap();
        assert_eq!(
            store.get_document("usuarios", &owner).await.unwrap(),
            Some(payload)
        );
        assert_eq!(store.get_document("perfiles", &owner).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_create_does_not_overwrite() {
        let store = store().await;
        let owner = IdentityHandle::new("uid-1");
        store
            .create_document("usuarios", &owner, &json!({"nombres": "Ana"}))
            .await
            .unwrap();

        let second = store
            .create_document("usuarios", &owner, &json!({"nombres": "Otra"}))
            .await;
        assert!(matches!(second, Err(StorageError::AlreadyExists(_))));
        let stored = store.get_document("usuarios", &owner).await.unwrap().unwrap();
        assert_eq!(stored["nombres"], "Ana");
    }

    #[tokio::test]
    async fn test_rejects_non_object_payload() {
        let store = store().await;
        let result = store
            .create_document("usuarios", &IdentityHandle::new("uid-1"), &json!(["x"]))
            .await;
        assert!(matches!(result, Err(StorageError::InvalidData(_))));
    }
}
