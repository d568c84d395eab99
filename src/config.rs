//! Environment-based configuration types for the registration server.

use anyhow::Result;
use std::time::Duration;

use crate::errors::ConfigError;
use crate::registration::orchestrator::DEFAULT_PROFILE_COLLECTION;
use crate::storage::firebase::{DEFAULT_AUTH_BASE, DEFAULT_FIRESTORE_BASE, FirebaseConfig};
use crate::storage::{IdentityBackend, StorageBackend, parse_identity_backend, parse_storage_backend};

/// HTTP server port configuration
#[derive(Clone, Debug)]
pub struct HttpPort(u16);

/// Certificate bundles for HTTPS connections
#[derive(Clone, Debug)]
pub struct CertificateBundles(Vec<String>);

/// HTTP client timeout configuration
#[derive(Clone, Debug)]
pub struct HttpClientTimeout(Duration);

/// Origins allowed to call the JSON API from a browser
#[derive(Clone, Debug, Default)]
pub struct CorsAllowedOrigins(Vec<String>);

/// Collection profile documents are written to
#[derive(Clone, Debug)]
pub struct ProfileCollection(String);

/// Main application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub version: String,
    pub http_port: HttpPort,
    pub http_static_path: String,
    pub http_templates_path: String,
    pub certificate_bundles: CertificateBundles,
    pub user_agent: String,
    pub http_client_timeout: HttpClientTimeout,
    pub cors_allowed_origins: CorsAllowedOrigins,
    pub identity_backend: IdentityBackend,
    pub storage_backend: StorageBackend,
    pub profile_collection: ProfileCollection,
    pub firebase: Option<FirebaseConfig>,
}

impl Config {
    /// Create a new configuration from environment variables
    pub fn new() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Create a configuration from any variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = EnvSource(lookup);

        let certificate_bundles: CertificateBundles =
            env.optional("CERTIFICATE_BUNDLES").try_into()?;
        let cors_allowed_origins: CorsAllowedOrigins =
            env.optional("CORS_ALLOWED_ORIGINS").try_into()?;
        let default_user_agent = format!("registro/{}", version()?);
        let http_client_timeout: HttpClientTimeout =
            env.default("HTTP_CLIENT_TIMEOUT", "10s").try_into()?;
        let http_port: HttpPort = env.default("HTTP_PORT", "8080").try_into()?;
        let http_static_path = env
            .optional("HTTP_STATIC_PATH")
            .unwrap_or_else(|| format!("{}/static", env!("CARGO_MANIFEST_DIR")));
        let http_templates_path = env
            .optional("HTTP_TEMPLATES_PATH")
            .unwrap_or_else(|| format!("{}/templates", env!("CARGO_MANIFEST_DIR")));
        let user_agent = env.default("USER_AGENT", &default_user_agent);
        let profile_collection: ProfileCollection =
            env.default("PROFILE_COLLECTION", DEFAULT_PROFILE_COLLECTION).try_into()?;

        let identity_backend_name = env.default("IDENTITY_BACKEND", "memory");
        let storage_backend_name = env.default("STORAGE_BACKEND", "memory");
        let database_url = env.optional("DATABASE_URL");
        let identity_backend = parse_identity_backend(&identity_backend_name)?;
        let storage_backend =
            parse_storage_backend(&storage_backend_name, database_url.as_deref())?;

        let uses_firebase = matches!(identity_backend, IdentityBackend::Firebase)
            || matches!(storage_backend, StorageBackend::Firebase);
        let firebase = if uses_firebase {
            Some(firebase_config(&env)?)
        } else {
            None
        };

        Ok(Self {
            version: version()?,
            http_port,
            http_static_path,
            http_templates_path,
            certificate_bundles,
            user_agent,
            http_client_timeout,
            cors_allowed_origins,
            identity_backend,
            storage_backend,
            profile_collection,
            firebase,
        })
    }
}

/// Get application version from build environment
pub fn version() -> Result<String> {
    option_env!("GIT_HASH")
        .or(option_env!("CARGO_PKG_VERSION"))
        .map(|val| val.to_string())
        .ok_or(ConfigError::VersionNotSet.into())
}

struct EnvSource<F>(F);

impl<F> EnvSource<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn require(&self, name: &str) -> Result<String, ConfigError> {
        self.optional(name)
            .ok_or_else(|| ConfigError::EnvVarRequired(name.to_string()))
    }

    /// Unset and empty are the same thing
    fn optional(&self, name: &str) -> Option<String> {
        (self.0)(name).filter(|value| !value.is_empty())
    }

    fn default(&self, name: &str, default_value: &str) -> String {
        self.optional(name)
            .unwrap_or_else(|| default_value.to_string())
    }
}

fn firebase_config<F>(env: &EnvSource<F>) -> Result<FirebaseConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let api_key = env.require("FIREBASE_API_KEY")?;
    let project_id = env.require("FIREBASE_PROJECT_ID")?;
    let auth_base = env.default("FIREBASE_AUTH_BASE", DEFAULT_AUTH_BASE);
    let firestore_base = env.default("FIRESTORE_BASE", DEFAULT_FIRESTORE_BASE);
    for base in [&auth_base, &firestore_base] {
        url::Url::parse(base).map_err(|err| ConfigError::UrlParsingFailed(base.clone(), err))?;
    }
    Ok(FirebaseConfig::new(api_key, project_id).with_bases(auth_base, firestore_base))
}

impl TryFrom<String> for HttpPort {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.is_empty() {
            Ok(Self(8080))
        } else {
            value
                .parse::<u16>()
                .map(Self)
                .map_err(|err| ConfigError::PortParsingFailed(err).into())
        }
    }
}

impl AsRef<u16> for HttpPort {
    fn as_ref(&self) -> &u16 {
        &self.0
    }
}

impl TryFrom<Option<String>> for CertificateBundles {
    type Error = anyhow::Error;

    fn try_from(value: Option<String>) -> Result<Self, Self::Error> {
        let value = value.unwrap_or_default();
        Ok(Self(
            value
                .split(';')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        ))
    }
}

impl AsRef<Vec<String>> for CertificateBundles {
    fn as_ref(&self) -> &Vec<String> {
        &self.0
    }
}

impl TryFrom<String> for HttpClientTimeout {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.is_empty() {
            return Ok(Self(Duration::from_secs(10)));
        }
        duration_str::parse(&value)
            .map(Self)
            .map_err(|e| ConfigError::DurationParsingFailed(value, e.to_string()))
    }
}

impl AsRef<Duration> for HttpClientTimeout {
    fn as_ref(&self) -> &Duration {
        &self.0
    }
}

impl TryFrom<Option<String>> for CorsAllowedOrigins {
    type Error = anyhow::Error;

    fn try_from(value: Option<String>) -> Result<Self, Self::Error> {
        let value = value.unwrap_or_default();
        let origins = value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|origin| {
                url::Url::parse(origin)
                    .map(|_| origin.trim_end_matches('/').to_string())
                    .map_err(|err| ConfigError::UrlParsingFailed(origin.to_string(), err))
            })
            .collect::<Result<Vec<String>, ConfigError>>()?;
        Ok(Self(origins))
    }
}

impl AsRef<Vec<String>> for CorsAllowedOrigins {
    fn as_ref(&self) -> &Vec<String> {
        &self.0
    }
}

impl TryFrom<String> for ProfileCollection {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let value = value.trim().to_string();
        if value.is_empty() || value.contains('/') {
            return Err(ConfigError::InvalidCollection(value));
        }
        Ok(Self(value))
    }
}

impl AsRef<str> for ProfileCollection {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(*config.http_port.as_ref(), 8080);
        assert_eq!(*config.http_client_timeout.as_ref(), Duration::from_secs(10));
        assert_eq!(config.profile_collection.as_ref(), "usuarios");
        assert!(config.cors_allowed_origins.as_ref().is_empty());
        assert!(config.certificate_bundles.as_ref().is_empty());
        assert!(matches!(config.identity_backend, IdentityBackend::Memory));
        assert!(matches!(config.storage_backend, StorageBackend::Memory));
        assert!(config.firebase.is_none());
        assert!(config.user_agent.starts_with("registro/"));
    }

    #[test]
    fn test_firebase_backend_requires_credentials() {
        let err = config_from(&[("IDENTITY_BACKEND", "firebase")]).unwrap_err();
        assert!(err.to_string().contains("FIREBASE_API_KEY"));

        let config = config_from(&[
            ("IDENTITY_BACKEND", "firebase"),
            ("STORAGE_BACKEND", "firebase"),
            ("FIREBASE_API_KEY", "key"),
            ("FIREBASE_PROJECT_ID", "demo"),
            ("FIRESTORE_BASE", "http://127.0.0.1:8081"),
        ])
        .unwrap();
        let firebase = config.firebase.unwrap();
        assert_eq!(firebase.project_id, "demo");
        assert_eq!(firebase.auth_base, DEFAULT_AUTH_BASE);
        assert_eq!(firebase.firestore_base, "http://127.0.0.1:8081");
    }

    #[test]
    fn test_invalid_values() {
        assert!(config_from(&[("HTTP_PORT", "http")]).is_err());
        assert!(config_from(&[("HTTP_CLIENT_TIMEOUT", "soon")]).is_err());
        assert!(config_from(&[("STORAGE_BACKEND", "mongo")]).is_err());
        assert!(config_from(&[("PROFILE_COLLECTION", "a/b")]).is_err());
        assert!(config_from(&[("CORS_ALLOWED_ORIGINS", "not a url")]).is_err());
    }

    #[test]
    fn test_list_values() {
        let config = config_from(&[
            ("CERTIFICATE_BUNDLES", "/etc/a.pem;;/etc/b.pem"),
            ("CORS_ALLOWED_ORIGINS", "https://app.example.com/, http://localhost:3000"),
            ("HTTP_CLIENT_TIMEOUT", "1m"),
        ])
        .unwrap();
        assert_eq!(config.certificate_bundles.as_ref().len(), 2);
        assert_eq!(
            config.cors_allowed_origins.as_ref(),
            &vec![
                "https://app.example.com".to_string(),
                "http://localhost:3000".to_string()
            ]
        );
        assert_eq!(*config.http_client_timeout.as_ref(), Duration::from_secs(60));
    }
}
