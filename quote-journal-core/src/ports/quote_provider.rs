//! Quote provider port

use async_trait::async_trait;

use crate::domain::result::Result;
use crate::domain::Quote;

/// Source of random quotes
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Provider name (e.g., "zenquotes", "demo")
    fn name(&self) -> &str;

    /// Fetch one random quote
    async fn random_quote(&self) -> Result<Quote>;
}
