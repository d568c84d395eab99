//! In-memory document store

use crate::errors::StorageError;
use crate::storage::traits::{DocumentStore, IdentityHandle, Result, require_object};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// In-memory document store (for testing/development)
#[derive(Default)]
pub struct MemoryDocumentStore {
    documents: Mutex<HashMap<(String, String), Value>>, // (collection, id) -> payload
    create_calls: AtomicUsize,
}

impl MemoryDocumentStore {
    /// Create a new memory document store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `create_document` calls received, successful or not
    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn create_document(
        &self,
        collection: &str,
        owner: &IdentityHandle,
        payload: &Value,
    ) -> Result<()> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        require_object(payload)?;

        let mut documents = self
            .documents
            .lock()
            .map_err(|e| StorageError::DatabaseError(format!("Lock error: {}", e)))?;

        match documents.entry((collection.to_string(), owner.uid.clone())) {
            Entry::Occupied(_) => Err(StorageError::AlreadyExists(format!(
                "{}/{}",
                collection, owner.uid
            ))),
            Entry::Vacant(slot) => {
                slot.insert(payload.clone());
                Ok(())
            }
        }
    }

    async fn get_document(
        &self,
        collection: &str,
        owner: &IdentityHandle,
    ) -> Result<Option<Value>> {
        let documents = self
            .documents
            .lock()
            .map_err(|e| StorageError::DatabaseError(format!("Lock error: {}", e)))?;
        Ok(documents
            .get(&(collection.to_string(), owner.uid.clone()))
            .cloned())
    }
}
