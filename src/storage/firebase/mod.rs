//! Firebase backends reached over their REST APIs.
//!
//! Identity creation goes through the Identity Toolkit `accounts:signUp`
//! endpoint and profiles through Firestore `createDocument`. Both are built
//! from an explicit [`FirebaseConfig`] value.

mod firestore;
mod identity;

pub use firestore::FirestoreDocumentStore;
pub use identity::FirebaseIdentityProvider;

use serde::Deserialize;

/// Default Identity Toolkit endpoint
pub const DEFAULT_AUTH_BASE: &str = "https://identitytoolkit.googleapis.com";

/// Default Firestore endpoint
pub const DEFAULT_FIRESTORE_BASE: &str = "https://firestore.googleapis.com";

/// Connection settings for one Firebase project
#[derive(Clone)]
pub struct FirebaseConfig {
    pub api_key: String,
    pub project_id: String,
    pub auth_base: String,
    pub firestore_base: String,
}

impl FirebaseConfig {
    pub fn new(api_key: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            project_id: project_id.into(),
            auth_base: DEFAULT_AUTH_BASE.to_string(),
            firestore_base: DEFAULT_FIRESTORE_BASE.to_string(),
        }
    }

    /// Point both services somewhere else, e.g. the local emulators
    pub fn with_bases(mut self, auth_base: impl Into<String>, firestore_base: impl Into<String>) -> Self {
        self.auth_base = auth_base.into();
        self.firestore_base = firestore_base.into();
        self
    }

    fn auth_endpoint(&self, method: &str) -> String {
        format!("{}/v1/accounts:{}", self.auth_base.trim_end_matches('/'), method)
    }

    fn documents_endpoint(&self) -> String {
        format!(
            "{}/v1/projects/{}/databases/(default)/documents",
            self.firestore_base.trim_end_matches('/'),
            self.project_id
        )
    }
}

impl std::fmt::Debug for FirebaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseConfig")
            .field("project_id", &self.project_id)
            .field("auth_base", &self.auth_base)
            .field("firestore_base", &self.firestore_base)
            .finish_non_exhaustive()
    }
}

/// Error envelope shared by Google REST APIs
#[derive(Debug, Deserialize)]
struct GoogleErrorResponse {
    error: GoogleError,
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// Pull the error message out of a Google API error body, if it has one
fn google_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<GoogleErrorResponse>(body)
        .ok()
        .map(|response| match response.error.status {
            Some(status) if response.error.message.is_empty() => status,
            _ => response.error.message,
        })
}
