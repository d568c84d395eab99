//! Standardized error types following the `error-registro-<domain>-<number>` format.

use axum::response::{IntoResponse, Response};
use http::StatusCode;
use thiserror::Error;

/// Configuration errors that occur during application startup
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Error when a required environment variable is not set
    #[error("error-registro-config-1 {0} must be set")]
    EnvVarRequired(String),

    /// Error when PORT cannot be parsed
    #[error("error-registro-config-2 Parsing PORT into u16 failed: {0:?}")]
    PortParsingFailed(std::num::ParseIntError),

    /// Error when version information is not available
    #[error("error-registro-config-3 One of GIT_HASH or CARGO_PKG_VERSION must be set")]
    VersionNotSet,

    /// Error when duration string cannot be parsed
    #[error("error-registro-config-4 Failed to parse duration '{0}': {1}")]
    DurationParsingFailed(String, String),

    /// Error when a URL setting cannot be parsed
    #[error("error-registro-config-5 Failed to parse URL '{0}': {1}")]
    UrlParsingFailed(String, url::ParseError),

    /// Error when a backend name is not recognized
    #[error("error-registro-config-6 Unknown {0} backend: {1}")]
    UnknownBackend(&'static str, String),

    /// Error when the profile collection name is unusable
    #[error("error-registro-config-7 Invalid profile collection '{0}'")]
    InvalidCollection(String),
}

/// HTTP server errors
#[derive(Debug, Error)]
pub enum HttpError {
    /// Error when request processing fails
    #[error("error-registro-http-1 Request processing failed: {0}")]
    RequestProcessingFailed(String),
}

/// Identity provider errors
#[derive(Debug, Error)]
pub enum IdentityError {
    /// An identity already exists for this email address
    #[error("error-registro-identity-1 Email already in use: {0}")]
    EmailAlreadyInUse(String),

    /// The provider rejected the request
    #[error("error-registro-identity-2 Identity creation rejected: {0}")]
    Rejected(String),

    /// The provider could not be reached
    #[error("error-registro-identity-3 Identity provider request failed: {0}")]
    RequestFailed(String),

    /// The provider answered with something we cannot read
    #[error("error-registro-identity-4 Invalid identity provider response: {0}")]
    InvalidResponse(String),
}

/// Document storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Error when database connection fails
    #[error("error-registro-storage-1 Database connection failed: {0}")]
    ConnectionFailed(String),

    /// Error when query execution fails
    #[error("error-registro-storage-2 Query execution failed: {0}")]
    QueryFailed(String),

    /// Error when data serialization fails
    #[error("error-registro-storage-3 Data serialization failed: {0}")]
    SerializationFailed(String),

    /// Error when database operation fails
    #[error("error-registro-storage-4 Database error: {0}")]
    DatabaseError(String),

    /// Error when data validation fails
    #[error("error-registro-storage-5 Invalid data: {0}")]
    InvalidData(String),

    /// A document with this id already exists in the collection
    #[error("error-registro-storage-6 Document already exists: {0}")]
    AlreadyExists(String),

    /// Error when the remote document service cannot be reached or refuses the write
    #[error("error-registro-storage-7 Document service request failed: {0}")]
    RequestFailed(String),
}

/// Classified failures of a registration submission.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// The identity provider reports the email is already registered
    #[error("error-registro-registration-1 Identity conflict: {0}")]
    IdentityConflict(String),

    /// Any other identity provider failure
    #[error("error-registro-registration-2 Identity creation failed: {0}")]
    IdentityCreation(IdentityError),

    /// Profile write failed after the identity was created
    #[error("error-registro-registration-3 Profile persistence failed for {uid}: {source}")]
    ProfilePersistence {
        /// Identity left without a profile document
        uid: String,
        /// Underlying store failure
        source: StorageError,
    },
}

impl From<IdentityError> for RegistrationError {
    fn from(error: IdentityError) -> Self {
        match error {
            IdentityError::EmailAlreadyInUse(email) => Self::IdentityConflict(email),
            other => Self::IdentityCreation(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, HttpError>;

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        tracing::error!(error = ?self, "internal server error");
        (StatusCode::INTERNAL_SERVER_ERROR).into_response()
    }
}
