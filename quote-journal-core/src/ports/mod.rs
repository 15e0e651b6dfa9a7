//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. The core domain
//! depends only on these traits, not on concrete implementations.

mod document_store;
mod identity;
mod quote_provider;

pub use document_store::DocumentStore;
pub use identity::{AccessTokenSource, IdentityProvider, SessionReceiver};
pub use quote_provider::QuoteProvider;
