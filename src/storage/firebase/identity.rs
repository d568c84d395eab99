//! Identity Toolkit `accounts:signUp` client

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::{FirebaseConfig, google_error_message};
use crate::errors::IdentityError;
use crate::storage::traits::{IdentityHandle, IdentityProvider};

/// Error message the service returns when the email is taken
const EMAIL_EXISTS: &str = "EMAIL_EXISTS";

/// Request for accounts:signUp
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignUpRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

/// Response from accounts:signUp
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignUpResponse {
    local_id: String,
    #[serde(default)]
    id_token: Option<String>,
}

/// Identity provider backed by Firebase Authentication
pub struct FirebaseIdentityProvider {
    http_client: reqwest::Client,
    config: FirebaseConfig,
}

impl FirebaseIdentityProvider {
    pub fn new(http_client: reqwest::Client, config: FirebaseConfig) -> Self {
        Self {
            http_client,
            config,
        }
    }
}

#[async_trait]
impl IdentityProvider for FirebaseIdentityProvider {
    async fn create_identity(
        &self,
        email: &str,
        password: &str,
    ) -> Result<IdentityHandle, IdentityError> {
        let url = url::Url::parse_with_params(
            &self.config.auth_endpoint("signUp"),
            &[("key", self.config.api_key.as_str())],
        )
        .map_err(|e| IdentityError::RequestFailed(format!("Invalid signUp URL: {}", e)))?;

        let response = self
            .http_client
            .post(url)
            .json(&SignUpRequest {
                email,
                password,
                return_secure_token: true,
            })
            .send()
            .await
            .map_err(|e| IdentityError::RequestFailed(format!("Failed to send signUp request: {}", e)))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(classify_sign_up_error(status, &body, email));
        }

        let sign_up: SignUpResponse = serde_json::from_str(&body).map_err(|e| {
            IdentityError::InvalidResponse(format!("Failed to parse signUp response: {}", e))
        })?;

        let handle = IdentityHandle::new(sign_up.local_id);
        Ok(match sign_up.id_token {
            Some(id_token) => handle.with_id_token(id_token),
            None => handle,
        })
    }
}

/// Map a failed signUp response to an [`IdentityError`].
///
/// Messages look like `EMAIL_EXISTS` or `WEAK_PASSWORD : Password should be at
/// least 6 characters`; only the leading code is compared.
fn classify_sign_up_error(status: StatusCode, body: &str, email: &str) -> IdentityError {
    match google_error_message(body) {
        Some(message) => {
            let code = message
                .split(|c: char| c == ':' || c.is_whitespace())
                .next()
                .unwrap_or_default();
            if code == EMAIL_EXISTS {
                IdentityError::EmailAlreadyInUse(email.to_string())
            } else if status.is_client_error() {
                IdentityError::Rejected(message)
            } else {
                IdentityError::RequestFailed(format!("signUp failed with status {}: {}", status, message))
            }
        }
        None => IdentityError::RequestFailed(format!("signUp failed with status {}: {}", status, body)),
    }
}
