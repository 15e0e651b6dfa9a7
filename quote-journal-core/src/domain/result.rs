//! Result and error types for the core library

use thiserror::Error;

use super::quote::QuoteDecodeError;

/// Core library error type
///
/// `LoginRequired` and `NoQuoteToSave` display as the exact alert text shown
/// to the user; `Auth` carries the identity provider's message verbatim.
#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Auth(String),

    #[error("Please log in first!")]
    LoginRequired,

    #[error("No quote to save!")]
    NoQuoteToSave,

    #[error("Store error: {0}")]
    Store(String),

    #[error("Quote fetch error: {0}")]
    QuoteFetch(String),

    #[error("Quote decode error: {0}")]
    QuoteDecode(#[from] QuoteDecodeError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Create an authentication error carrying the provider's message
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    /// Create a document store error
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Create a quote fetch error
    pub fn quote_fetch(msg: impl Into<String>) -> Self {
        Self::QuoteFetch(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;
