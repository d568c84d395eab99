//! User self-registration library crate.
//!
//! Sanitizes and validates a registration form, creates the user's identity and
//! persists a profile document, and serves the flow over HTTP.

pub mod config;
pub mod errors;
pub mod http;
pub mod registration;
pub mod storage;
pub mod templates;
