//! Collaborator trait definitions for identity creation and profile documents.
//!
//! The registration flow only talks to these traits; concrete backends live in
//! the sibling modules.

use crate::errors::{IdentityError, StorageError};
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

pub type Result<T> = std::result::Result<T, StorageError>;

/// Handle of a freshly created identity.
#[derive(Clone, PartialEq, Eq)]
pub struct IdentityHandle {
    /// Opaque unique id assigned by the identity provider
    pub uid: String,
    /// Bearer credential issued with the identity, when the provider returns one
    pub id_token: Option<String>,
}

impl IdentityHandle {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            id_token: None,
        }
    }

    pub fn with_id_token(mut self, id_token: impl Into<String>) -> Self {
        self.id_token = Some(id_token.into());
        self
    }
}

impl fmt::Debug for IdentityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityHandle")
            .field("uid", &self.uid)
            .field("id_token", &self.id_token.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

/// External service that creates user credentials
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an identity for `email` protected by `password`.
    ///
    /// Fails with [`IdentityError::EmailAlreadyInUse`] when the email is taken.
    async fn create_identity(
        &self,
        email: &str,
        password: &str,
    ) -> std::result::Result<IdentityHandle, IdentityError>;
}

/// External service persisting structured documents keyed by id
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create the document `collection/owner.uid`. Fails with
    /// [`StorageError::AlreadyExists`] instead of overwriting.
    async fn create_document(
        &self,
        collection: &str,
        owner: &IdentityHandle,
        payload: &Value,
    ) -> Result<()>;

    /// Read back the document `collection/owner.uid`, as its owner
    async fn get_document(
        &self,
        collection: &str,
        owner: &IdentityHandle,
    ) -> Result<Option<Value>>;
}

/// Documents are flat JSON objects; anything else is rejected before a write.
pub(crate) fn require_object(payload: &Value) -> Result<&serde_json::Map<String, Value>> {
    payload
        .as_object()
        .ok_or_else(|| StorageError::InvalidData("document payload must be an object".to_string()))
}
