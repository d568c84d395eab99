//! Submission of a validated registration to the identity provider and the
//! profile document store.

use serde::Serialize;
use std::sync::Arc;

use super::notify::Notification;
use super::validation::CleanRecord;
use crate::errors::{RegistrationError, StorageError};
use crate::storage::traits::{DocumentStore, IdentityProvider};

/// Collection profile documents are written to unless configured otherwise
pub const DEFAULT_PROFILE_COLLECTION: &str = "usuarios";

pub const TITLE_SUCCESS: &str = "¡Registro exitoso!";
pub const MSG_SUCCESS: &str = "Usuario registrado correctamente.";
pub const TITLE_ERROR: &str = "Error";
pub const MSG_EMAIL_TAKEN: &str = "Este correo ya está registrado.";
pub const MSG_REGISTRATION_FAILED: &str = "No se pudo registrar el usuario.";

/// Review status of a new profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileStatus {
    Pendiente,
}

/// Profile document persisted for a new identity. The password is never part of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDocument {
    pub cedula: String,
    pub nombres: String,
    pub apellidos: String,
    pub fecha_nacimiento: String,
    pub sexo: String,
    pub telefono: String,
    pub email: String,
    pub estado: ProfileStatus,
}

impl From<&CleanRecord> for ProfileDocument {
    fn from(record: &CleanRecord) -> Self {
        Self {
            cedula: record.cedula.clone(),
            nombres: record.nombres.clone(),
            apellidos: record.apellidos.clone(),
            fecha_nacimiento: record.fecha_nacimiento.clone(),
            sexo: record.sexo.clone(),
            telefono: record.telefono.clone(),
            email: record.email.clone(),
            estado: ProfileStatus::Pendiente,
        }
    }
}

/// A completed registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registered {
    pub uid: String,
}

/// Result of one submission
pub type RegistrationOutcome = Result<Registered, RegistrationError>;

/// The notification a finished submission produces
pub fn outcome_notification(outcome: &RegistrationOutcome) -> Notification {
    match outcome {
        Ok(_) => Notification::success(TITLE_SUCCESS, MSG_SUCCESS),
        Err(RegistrationError::IdentityConflict(_)) => {
            Notification::error(TITLE_ERROR, MSG_EMAIL_TAKEN)
        }
        Err(_) => Notification::error(TITLE_ERROR, MSG_REGISTRATION_FAILED),
    }
}

/// Runs the two external registration steps
pub struct RegistrationService {
    identity_provider: Arc<dyn IdentityProvider>,
    document_store: Arc<dyn DocumentStore>,
    collection: String,
}

impl RegistrationService {
    pub fn new(
        identity_provider: Arc<dyn IdentityProvider>,
        document_store: Arc<dyn DocumentStore>,
    ) -> Self {
        Self {
            identity_provider,
            document_store,
            collection: DEFAULT_PROFILE_COLLECTION.to_string(),
        }
    }

    /// Write profiles to a different collection
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Create the identity, then its profile document.
    ///
    /// The profile step only runs when the identity was created. A failed
    /// profile write leaves the identity in place.
    pub async fn submit(&self, record: &CleanRecord) -> RegistrationOutcome {
        let handle = match self
            .identity_provider
            .create_identity(&record.email, &record.password)
            .await
        {
            Ok(handle) => handle,
            Err(err) => {
                let err = RegistrationError::from(err);
                match &err {
                    RegistrationError::IdentityConflict(email) => {
                        tracing::warn!(%email, "email already registered");
                    }
                    _ => tracing::error!(error = ?err, "identity creation failed"),
                }
                return Err(err);
            }
        };

        let document = ProfileDocument::from(record);
        let payload = match serde_json::to_value(&document) {
            Ok(payload) => payload,
            Err(err) => {
                return Err(self.profile_failure(
                    &handle.uid,
                    StorageError::SerializationFailed(err.to_string()),
                ));
            }
        };

        if let Err(err) = self
            .document_store
            .create_document(&self.collection, &handle, &payload)
            .await
        {
            return Err(self.profile_failure(&handle.uid, err));
        }

        tracing::info!(uid = %handle.uid, collection = %self.collection, "user registered");
        Ok(Registered { uid: handle.uid })
    }

    fn profile_failure(&self, uid: &str, source: StorageError) -> RegistrationError {
        tracing::error!(
            %uid,
            collection = %self.collection,
            error = ?source,
            "profile persistence failed; identity exists without a profile document"
        );
        RegistrationError::ProfilePersistence {
            uid: uid.to_string(),
            source,
        }
    }
}
