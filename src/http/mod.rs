//! Axum HTTP server: the registration page, its JSON API and static assets.

pub mod context;
mod handler_index;
mod handler_registro;
mod handler_registro_api;
pub mod server;

pub use context::{AppEngine, AppState};
pub use handler_registro_api::RegistrationResponse;
pub use server::build_router;
