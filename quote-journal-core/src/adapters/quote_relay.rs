//! Quote provider behind a CORS relay
//!
//! ZenQuotes is reached through the allorigins `get` endpoint, which wraps the
//! upstream body as a JSON string in `{"contents": "..."}`. The inner URL gets
//! a `t=<unix millis>` cache buster so the relay never serves a stale quote.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::domain::result::{Error as DomainError, Result as DomainResult};
use crate::domain::{decode_relay_envelope, Quote};
use crate::ports::QuoteProvider;

/// ZenQuotes random-quote endpoint
pub const DEFAULT_QUOTE_URL: &str = "https://zenquotes.io/api/random";

/// allorigins relay endpoint
pub const DEFAULT_RELAY_URL: &str = "https://api.allorigins.win/get";

/// Quote provider that goes through the relay
#[derive(Debug)]
pub struct RelayQuoteProvider {
    client: Client,
    quote_url: Url,
    relay_url: Url,
    timeout: Duration,
}

impl RelayQuoteProvider {
    pub fn new(quote_url: &str, relay_url: &str, timeout: Duration) -> Result<Self> {
        let quote_url =
            Url::parse(quote_url).with_context(|| format!("Invalid quote URL: {}", quote_url))?;
        let relay_url =
            Url::parse(relay_url).with_context(|| format!("Invalid relay URL: {}", relay_url))?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            quote_url,
            relay_url,
            timeout,
        })
    }

    /// Relay URL wrapping the quote URL with the given cache buster
    pub fn request_url(&self, cache_buster: i64) -> Url {
        let mut inner = self.quote_url.clone();
        inner
            .query_pairs_mut()
            .append_pair("t", &cache_buster.to_string());

        let mut outer = self.relay_url.clone();
        outer.query_pairs_mut().append_pair("url", inner.as_str());
        outer
    }

    async fn fetch_body(&self) -> DomainResult<String> {
        let url = self.request_url(Utc::now().timestamp_millis());
        debug!(url = %url, "Requesting quote");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::quote_fetch(format!(
                "Quote relay returned HTTP {}",
                status.as_u16()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| DomainError::quote_fetch(format!("Failed to read relay response: {}", e)))
    }

    fn map_request_error(&self, error: reqwest::Error) -> DomainError {
        if error.is_timeout() {
            DomainError::quote_fetch(format!(
                "Connection timed out after {} seconds",
                self.timeout.as_secs()
            ))
        } else if error.is_connect() {
            DomainError::quote_fetch("Unable to connect to the quote relay")
        } else {
            DomainError::quote_fetch(format!("Quote request failed: {}", error))
        }
    }
}

#[async_trait]
impl QuoteProvider for RelayQuoteProvider {
    fn name(&self) -> &str {
        "zenquotes"
    }

    async fn random_quote(&self) -> DomainResult<Quote> {
        let body = self.fetch_body().await?;
        Ok(decode_relay_envelope(&body)?)
    }
}
