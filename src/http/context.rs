//! Application state shared by the request handlers.

use axum_template::engine::Engine;
use std::sync::Arc;

use crate::config::Config;
use crate::registration::RegistrationService;

#[cfg(feature = "reload")]
use minijinja_autoreload::AutoReloader;

#[cfg(feature = "reload")]
/// Template engine with auto-reloading support for development.
pub type AppEngine = Engine<AutoReloader>;

#[cfg(feature = "embed")]
use minijinja::Environment;

#[cfg(feature = "embed")]
pub type AppEngine = Engine<Environment<'static>>;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Template engine for rendering HTML responses.
    pub template_env: AppEngine,
    /// Runs identity creation and profile persistence for submitted forms
    pub registration_service: Arc<RegistrationService>,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        template_env: AppEngine,
        registration_service: Arc<RegistrationService>,
    ) -> Self {
        Self {
            config,
            template_env,
            registration_service,
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::storage::{MemoryDocumentStore, MemoryIdentityProvider};

    /// State over in-memory backends and the repository templates
    pub(crate) fn memory_state() -> (AppState, Arc<MemoryIdentityProvider>, Arc<MemoryDocumentStore>) {
        let config = Config::from_lookup(|_| None).unwrap();
        let identity = Arc::new(MemoryIdentityProvider::new());
        let documents = Arc::new(MemoryDocumentStore::new());
        let service = RegistrationService::new(identity.clone(), documents.clone());
        let template_env = crate::templates::build_engine(&config.http_templates_path, "test");
        (
            AppState::new(Arc::new(config), template_env, Arc::new(service)),
            identity,
            documents,
        )
    }
}
