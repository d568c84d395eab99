//! Minijinja template engine configuration with embedded and auto-reload modes.

use axum_template::engine::Engine;

use crate::http::context::AppEngine;

#[cfg(feature = "reload")]
/// Build template environment with auto-reloading for development
pub fn build_env(template_path: String, version: String) -> minijinja_autoreload::AutoReloader {
    reload_env::build_env(template_path, version)
}

#[cfg(feature = "embed")]
/// Build template environment with embedded templates for production
pub fn build_env(version: String) -> minijinja::Environment<'static> {
    embed_env::build_env(version)
}

/// Build the engine handlers render with. `template_path` is only read in reload mode.
pub fn build_engine(template_path: &str, version: &str) -> AppEngine {
    #[cfg(feature = "reload")]
    let env = build_env(template_path.to_string(), version.to_string());

    #[cfg(feature = "embed")]
    let env = {
        let _ = template_path;
        build_env(version.to_string())
    };

    Engine::new(env)
}

#[cfg(feature = "reload")]
mod reload_env {
    use minijinja::{Environment, path_loader};
    use minijinja_autoreload::AutoReloader;

    pub fn build_env(template_path: String, version: String) -> AutoReloader {
        AutoReloader::new(move |notifier| {
            let mut env = Environment::new();
            env.set_trim_blocks(true);
            env.set_lstrip_blocks(true);
            env.add_global("version", version.clone());
            env.set_loader(path_loader(&template_path));
            notifier.set_fast_reload(true);
            notifier.watch_path(&template_path, true);
            Ok(env)
        })
    }
}

#[cfg(feature = "embed")]
mod embed_env {
    use minijinja::Environment;

    pub fn build_env(version: String) -> Environment<'static> {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.add_global("version", version);
        minijinja_embed::load_templates!(&mut env);
        env
    }
}
