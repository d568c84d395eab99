//! In-memory identity provider
//!
//! Emails are compared case-insensitively, matching how hosted identity
//! providers treat them. Passwords are not kept.

use crate::errors::IdentityError;
use crate::storage::traits::{IdentityHandle, IdentityProvider};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory identity provider (for testing/development)
#[derive(Default)]
pub struct MemoryIdentityProvider {
    identities: Mutex<HashMap<String, String>>, // normalized email -> uid
}

impl MemoryIdentityProvider {
    /// Create a new memory identity provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an identity exists for this email
    pub fn contains(&self, email: &str) -> bool {
        self.identities
            .lock()
            .map(|identities| identities.contains_key(&normalize(email)))
            .unwrap_or(false)
    }

    /// Number of identities created
    pub fn len(&self) -> usize {
        self.identities
            .lock()
            .map(|identities| identities.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

#[async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    async fn create_identity(
        &self,
        email: &str,
        _password: &str,
    ) -> Result<IdentityHandle, IdentityError> {
        let mut identities = self.identities.lock().map_err(|e| {
            IdentityError::RequestFailed(format!("Failed to acquire identity store lock: {}", e))
        })?;

        let key = normalize(email);
        if identities.contains_key(&key) {
            return Err(IdentityError::EmailAlreadyInUse(email.to_string()));
        }

        let uid = uuid::Uuid::new_v4().simple().to_string();
        identities.insert(key, uid.clone());
        Ok(IdentityHandle::new(uid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_identity_assigns_unique_ids() {
        let provider = MemoryIdentityProvider::new();
        let first = provider.create_identity("a@example.com", "Abcdef1!").await.unwrap();
        let second = provider.create_identity("b@example.com", "Abcdef1!").await.unwrap();

        assert_ne!(first.uid, second.uid);
        assert!(first.id_token.is_none());
        assert_eq!(provider.len(), 2);
    }

    #[tokio::test]
    async fn test_email_conflict_is_case_insensitive() {
        let provider = MemoryIdentityProvider::new();
        provider.create_identity("dup@x.com", "Abcdef1!").await.unwrap();

        let result = provider.create_identity("DUP@x.com", "Abcdef1!").await;
        assert!(matches!(result, Err(IdentityError::EmailAlreadyInUse(ref email)) if email == "DUP@x.com"));
        assert_eq!(provider.len(), 1);
        assert!(provider.contains("Dup@X.com"));
    }
}
