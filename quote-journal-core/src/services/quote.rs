//! Quote service - fetch a quote and put it in the quote box

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info};

use crate::domain::{Quote, QUOTE_FETCH_FAILED};
use crate::ports::QuoteProvider;
use crate::state::StateStore;

/// What a fetch left in the quote box
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum QuoteFetch {
    Fetched(Quote),
    Fallback,
}

/// Quote service
#[derive(Clone)]
pub struct QuoteService {
    provider: Arc<dyn QuoteProvider>,
    state: StateStore,
}

impl QuoteService {
    pub fn new(provider: Arc<dyn QuoteProvider>, state: StateStore) -> Self {
        Self { provider, state }
    }

    /// Fetch one quote.
    ///
    /// Never fails: on any error the quote box shows the fallback message,
    /// the error is logged, and the previously fetched quote stays current.
    pub async fn fetch_quote(&self) -> QuoteFetch {
        match self.provider.random_quote().await {
            Ok(quote) => {
                info!(provider = self.provider.name(), "Quote fetched");
                let display = quote.display_text();
                let current = quote.clone();
                self.state.update(move |s| {
                    s.quote_text = display;
                    s.current_quote = Some(current);
                });
                QuoteFetch::Fetched(quote)
            }
            Err(e) => {
                error!(provider = self.provider.name(), error = %e, "Error fetching quote");
                self.state
                    .update(|s| s.quote_text = QUOTE_FETCH_FAILED.to_string());
                QuoteFetch::Fallback
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::StaticQuoteProvider;

    #[tokio::test]
    async fn test_fetch_sets_text_and_current_quote() {
        let state = StateStore::new();
        let provider = Arc::new(StaticQuoteProvider::new(vec![Quote::new("Be water.", "Bruce Lee")]));
        let service = QuoteService::new(provider, state.clone());

        let outcome = service.fetch_quote().await;

        assert_eq!(outcome, QuoteFetch::Fetched(Quote::new("Be water.", "Bruce Lee")));
        let snapshot = state.snapshot();
        assert_eq!(snapshot.quote_text, "Be water. — Bruce Lee");
        assert_eq!(snapshot.current_quote, Some(Quote::new("Be water.", "Bruce Lee")));
    }

    #[tokio::test]
    async fn test_failure_shows_fallback_and_keeps_previous_quote() {
        let state = StateStore::new();
        let previous = Quote::new("Earlier", "Someone");
        state.update(|s| s.current_quote = Some(previous.clone()));

        let service = QuoteService::new(Arc::new(StaticQuoteProvider::new(Vec::new())), state.clone());
        let outcome = service.fetch_quote().await;

        assert_eq!(outcome, QuoteFetch::Fallback);
        let snapshot = state.snapshot();
        assert_eq!(snapshot.quote_text, QUOTE_FETCH_FAILED);
        assert_eq!(snapshot.current_quote, Some(previous));
    }

    #[tokio::test]
    async fn test_repeated_fetches_each_hit_the_provider() {
        let state = StateStore::new();
        let provider = Arc::new(StaticQuoteProvider::demo());
        let service = QuoteService::new(provider.clone(), state);

        let (a, b) = tokio::join!(service.fetch_quote(), service.fetch_quote());

        assert!(matches!(a, QuoteFetch::Fetched(_)));
        assert!(matches!(b, QuoteFetch::Fetched(_)));
        assert_eq!(provider.request_count(), 2);
    }
}
