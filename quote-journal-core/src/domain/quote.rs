//! Quote domain model and relay envelope decoding

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Text shown in place of a quote when fetching fails
pub const QUOTE_FETCH_FAILED: &str = "Failed to fetch quote. Please try again.";

/// A quote and its author, as returned by the quote provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub quote: String,
    pub author: String,
}

impl Quote {
    pub fn new(quote: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            quote: quote.into(),
            author: author.into(),
        }
    }

    /// Text shown in the quote box: `"<quote> — <author>"`
    pub fn display_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} — {}", self.quote, self.author)
    }
}

/// Failure to decode the relay's double-encoded response
#[derive(Debug, Error)]
pub enum QuoteDecodeError {
    #[error("malformed relay envelope: {0}")]
    Envelope(#[source] serde_json::Error),

    #[error("relay envelope has no contents")]
    MissingContents,

    #[error("malformed quote payload: {0}")]
    Payload(#[source] serde_json::Error),

    #[error("quote payload is empty")]
    Empty,
}

/// Outer envelope: `{ "contents": "<json string>", "status": {...} }`
#[derive(Debug, Deserialize)]
struct RelayEnvelope {
    #[serde(default)]
    contents: Option<String>,
}

/// Inner payload element: `{ "q": "...", "a": "...", "h": "..." }`
#[derive(Debug, Deserialize)]
struct QuotePayload {
    q: String,
    a: String,
}

/// Decode a relay response body into the first quote it carries.
///
/// The relay wraps the upstream body as a JSON string inside `contents`, so
/// the body is parsed twice: once for the envelope and once for the array of
/// quotes inside it.
pub fn decode_relay_envelope(body: &str) -> Result<Quote, QuoteDecodeError> {
    let envelope: RelayEnvelope =
        serde_json::from_str(body).map_err(QuoteDecodeError::Envelope)?;

    let contents = envelope
        .contents
        .ok_or(QuoteDecodeError::MissingContents)?;

    let payload: Vec<QuotePayload> =
        serde_json::from_str(&contents).map_err(QuoteDecodeError::Payload)?;

    payload
        .into_iter()
        .next()
        .map(|p| Quote::new(p.q, p.a))
        .ok_or(QuoteDecodeError::Empty)
}
