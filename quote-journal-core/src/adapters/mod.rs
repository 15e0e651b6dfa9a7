//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - Firebase Authentication REST client for IdentityProvider
//! - Firestore REST client for DocumentStore
//! - ZenQuotes via the allorigins relay for QuoteProvider
//! - In-memory backends for demo mode and tests

pub mod firebase_auth;
pub mod firestore;
pub mod memory;
pub mod quote_relay;

#[cfg(test)]
pub mod http_mock;
