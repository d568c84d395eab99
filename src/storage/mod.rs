//! Identity and document backends: in-memory, Firebase REST, SQLite and PostgreSQL.

pub mod firebase;
pub mod inmemory;
pub mod traits;

// Feature-gated storage implementations
#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use firebase::{FirebaseConfig, FirebaseIdentityProvider, FirestoreDocumentStore};
pub use inmemory::{MemoryDocumentStore, MemoryIdentityProvider};
pub use traits::*;

use crate::errors::ConfigError;
use std::sync::Arc;

/// Identity backend configuration
#[derive(Clone, Debug)]
pub enum IdentityBackend {
    Memory,
    Firebase,
}

/// Document storage backend configuration
#[derive(Clone, Debug)]
pub enum StorageBackend {
    Memory,
    Firebase,
    #[cfg(feature = "sqlite")]
    Sqlite(String), // Connection string/path
    #[cfg(feature = "postgres")]
    Postgres(String), // Connection string
}

/// Parse the identity backend from its configuration name
pub fn parse_identity_backend(
    backend_name: &str,
) -> std::result::Result<IdentityBackend, ConfigError> {
    match backend_name {
        "memory" => Ok(IdentityBackend::Memory),
        "firebase" => Ok(IdentityBackend::Firebase),
        _ => Err(ConfigError::UnknownBackend("identity", backend_name.to_string())),
    }
}

/// Parse the storage backend from its configuration name
pub fn parse_storage_backend(
    backend_name: &str,
    #[cfg_attr(
        not(any(feature = "sqlite", feature = "postgres")),
        allow(unused_variables)
    )]
    database_url: Option<&str>,
) -> std::result::Result<StorageBackend, ConfigError> {
    match backend_name {
        "memory" => Ok(StorageBackend::Memory),
        "firebase" => Ok(StorageBackend::Firebase),
        #[cfg(feature = "sqlite")]
        "sqlite" => {
            let url = database_url.unwrap_or("sqlite:registro.db?mode=rwc");
            Ok(StorageBackend::Sqlite(url.to_string()))
        }
        #[cfg(feature = "postgres")]
        "postgres" => {
            let url = database_url
                .ok_or_else(|| ConfigError::EnvVarRequired("DATABASE_URL".to_string()))?;
            Ok(StorageBackend::Postgres(url.to_string()))
        }
        _ => Err(ConfigError::UnknownBackend("storage", backend_name.to_string())),
    }
}

/// Create the identity provider for a backend.
///
/// The Firebase backend needs `firebase` settings; asking for it without them
/// is a configuration error.
pub fn create_identity_provider(
    backend: &IdentityBackend,
    http_client: &reqwest::Client,
    firebase: Option<&FirebaseConfig>,
) -> std::result::Result<Arc<dyn IdentityProvider>, ConfigError> {
    match backend {
        IdentityBackend::Memory => Ok(Arc::new(MemoryIdentityProvider::new())),
        IdentityBackend::Firebase => {
            let config = firebase
                .ok_or_else(|| ConfigError::EnvVarRequired("FIREBASE_API_KEY".to_string()))?;
            Ok(Arc::new(FirebaseIdentityProvider::new(
                http_client.clone(),
                config.clone(),
            )))
        }
    }
}

/// Create the document store for a backend, running migrations for SQL backends
pub async fn create_document_store(
    backend: &StorageBackend,
    http_client: &reqwest::Client,
    firebase: Option<&FirebaseConfig>,
) -> anyhow::Result<Arc<dyn DocumentStore>> {
    match backend {
        StorageBackend::Memory => Ok(Arc::new(MemoryDocumentStore::new())),
        StorageBackend::Firebase => {
            let config = firebase
                .ok_or_else(|| ConfigError::EnvVarRequired("FIREBASE_API_KEY".to_string()))?;
            Ok(Arc::new(FirestoreDocumentStore::new(
                http_client.clone(),
                config.clone(),
            )))
        }
        #[cfg(feature = "sqlite")]
        StorageBackend::Sqlite(database_url) => {
            let pool = sqlx::SqlitePool::connect(database_url)
                .await
                .map_err(|e| {
                    crate::errors::StorageError::ConnectionFailed(format!("SQLite connection failed: {}", e))
                })?;

            let storage = sqlite::SqliteDocumentStore::new(pool);
            storage.migrate().await?;
            Ok(Arc::new(storage))
        }
        #[cfg(feature = "postgres")]
        StorageBackend::Postgres(database_url) => {
            let pool = sqlx::postgres::PgPool::connect(database_url)
                .await
                .map_err(|e| {
                    crate::errors::StorageError::ConnectionFailed(format!("PostgreSQL connection failed: {}", e))
                })?;

            let storage = postgres::PostgresDocumentStore::new(pool);
            storage.migrate().await?;
            Ok(Arc::new(storage))
        }
    }
}
