//! In-memory storage implementations
//!
//! This module provides in-memory identity and document backends.
//! These implementations are suitable for development and testing.

mod documents;
mod identity;

pub use documents::MemoryDocumentStore;
pub use identity::MemoryIdentityProvider;
