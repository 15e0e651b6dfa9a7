//! Quote Journal Core - fetch daily quotes, keep favorites and a journal
//!
//! This crate implements the core logic following hexagonal architecture:
//!
//! - **domain**: Core entities (Quote, SessionUser, collection records)
//! - **ports**: Trait definitions for external services (IdentityProvider,
//!   DocumentStore, QuoteProvider)
//! - **services**: Session controller, quote fetcher, collection sync, auth
//! - **adapters**: Concrete implementations (Firebase Auth, Firestore, quote
//!   relay, in-memory demo backends)
//! - **state** / **view**: application state and the pure view model

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;
pub mod state;
pub mod view;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::info;

use adapters::firebase_auth::{FirebaseAuth, FirebaseAuthSettings};
use adapters::firestore::{FirestoreSettings, FirestoreStore};
use adapters::memory::{InMemoryDocumentStore, InMemoryIdentityProvider, StaticQuoteProvider};
use adapters::quote_relay::RelayQuoteProvider;
use config::Config;
use ports::{DocumentStore, IdentityProvider, QuoteProvider};
use services::*;
use state::{AppState, StateStore};
use view::Screen;

// Re-export commonly used types at crate root
pub use domain::result::Error;
pub use domain::{Favorite, JournalEntry, Quote, SavedQuote, SessionUser};
pub use services::{QuoteFetch, SaveReceipt};

/// Main context for Quote Journal operations
///
/// Holds the configuration, the shared application state and all services.
/// `mount` starts listening for session changes and fetches the first quote;
/// `unmount` (or dropping the context) stops listening.
pub struct QuoteJournalContext {
    pub config: Config,
    pub state: StateStore,
    pub auth_service: AuthService,
    pub quote_service: QuoteService,
    pub collection_sync: CollectionSync,
    identity: Arc<dyn IdentityProvider>,
    controller: Option<SessionController>,
}

impl QuoteJournalContext {
    /// Create a context for the given configuration
    ///
    /// Demo mode wires the in-memory backends; otherwise the Firebase project
    /// in the configuration is used.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        if config.demo_mode {
            info!("Using in-memory demo backends");
            return Ok(Self::from_adapters(
                config,
                Arc::new(InMemoryIdentityProvider::new()),
                Arc::new(InMemoryDocumentStore::new()),
                Arc::new(StaticQuoteProvider::demo()),
            ));
        }

        let firebase = &config.firebase;
        let auth = Arc::new(FirebaseAuth::new(FirebaseAuthSettings {
            api_key: firebase.api_key.clone().unwrap_or_default(),
            auth_url: firebase.auth_url.clone(),
            token_url: firebase.token_url.clone(),
            timeout: config.http_timeout,
        })?);
        let store = Arc::new(FirestoreStore::new(
            FirestoreSettings {
                project_id: firebase.project_id.clone().unwrap_or_default(),
                base_url: firebase.firestore_url.clone(),
                timeout: config.http_timeout,
            },
            auth.clone(),
        )?);
        let quotes = quote_provider(&config)?;

        Ok(Self::from_adapters(config, auth, store, quotes))
    }

    /// Quote service on its own, for fetching while logged out
    ///
    /// Needs no Firebase project, so it works before any account is set up.
    pub fn quote_service(config: &Config) -> Result<QuoteService> {
        Ok(QuoteService::new(quote_provider(config)?, StateStore::new()))
    }

    /// Create a context from explicit adapters
    pub fn from_adapters(
        config: Config,
        identity: Arc<dyn IdentityProvider>,
        store: Arc<dyn DocumentStore>,
        quotes: Arc<dyn QuoteProvider>,
    ) -> Self {
        let state = StateStore::new();

        let auth_service = AuthService::new(Arc::clone(&identity));
        let quote_service = QuoteService::new(quotes, state.clone());
        let collection_sync = CollectionSync::new(store, state.clone());

        Self {
            config,
            state,
            auth_service,
            quote_service,
            collection_sync,
            identity,
            controller: None,
        }
    }

    /// Name of the identity backend ("firebase" or "demo")
    pub fn provider_name(&self) -> &str {
        self.identity.name()
    }

    /// Start the session controller and fetch the first quote
    pub async fn mount(&mut self) -> QuoteFetch {
        if self.controller.is_none() {
            self.controller = Some(SessionController::start(
                self.identity.as_ref(),
                self.collection_sync.clone(),
                self.state.clone(),
            ));
        }
        self.quote_service.fetch_quote().await
    }

    /// Stop listening for session changes
    pub fn unmount(&mut self) {
        if let Some(controller) = self.controller.take() {
            controller.stop();
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.controller.as_ref().is_some_and(|c| c.is_running())
    }

    /// Replace the journal input text
    pub fn set_journal_draft(&self, text: impl Into<String>) {
        let text = text.into();
        self.state.update(|s| s.journal_draft = text);
    }

    /// Render the current state
    pub fn screen(&self) -> Screen {
        view::render(&self.state.snapshot())
    }

    /// Wait until the state satisfies `pred`. Returns false on timeout.
    pub async fn wait_for(
        &self,
        pred: impl FnMut(&AppState) -> bool,
        timeout: Duration,
    ) -> bool {
        let mut rx = self.state.subscribe();
        let settled = matches!(
            tokio::time::timeout(timeout, rx.wait_for(pred)).await,
            Ok(Ok(_))
        );
        settled
    }
}

fn quote_provider(config: &Config) -> Result<Arc<dyn QuoteProvider>> {
    if config.demo_mode {
        return Ok(Arc::new(StaticQuoteProvider::demo()));
    }
    Ok(Arc::new(RelayQuoteProvider::new(
        &config.quotes.quote_url,
        &config.quotes.relay_url,
        config.http_timeout,
    )?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_context() -> QuoteJournalContext {
        QuoteJournalContext::from_adapters(
            Config::default(),
            Arc::new(InMemoryIdentityProvider::new()),
            Arc::new(InMemoryDocumentStore::new()),
            Arc::new(StaticQuoteProvider::demo()),
        )
    }

    #[tokio::test]
    async fn test_wait_for_returns_true_once_state_matches() {
        let ctx = demo_context();
        ctx.set_journal_draft("first thoughts");

        assert!(
            ctx.wait_for(|s| s.journal_draft == "first thoughts", Duration::from_secs(1))
                .await
        );
    }

    #[tokio::test]
    async fn test_wait_for_sees_later_updates() {
        let ctx = demo_context();
        let state = ctx.state.clone();
        let writer = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            state.update(|s| s.journal_draft = "later".to_string());
        });

        assert!(
            ctx.wait_for(|s| s.journal_draft == "later", Duration::from_secs(5))
                .await
        );
        writer.await.unwrap();
    }

    #[tokio::test]
    async fn test_quote_service_needs_no_firebase_project() {
        let mut config = Config::default();
        assert!(config.validate().is_err());
        assert!(QuoteJournalContext::new(config.clone()).is_err());

        config.enable_demo_mode();
        let service = QuoteJournalContext::quote_service(&config).unwrap();
        let outcome = service.fetch_quote().await;
        assert!(matches!(outcome, QuoteFetch::Fetched(ref q) if q.author == "Bruce Lee"));
    }

    #[test]
    fn test_quote_service_builds_relay_without_firebase() {
        let config = Config::default();
        assert!(config.firebase.api_key.is_none());
        assert!(QuoteJournalContext::quote_service(&config).is_ok());
    }

    #[tokio::test]
    async fn test_wait_for_times_out() {
        let ctx = demo_context();
        assert!(
            !ctx.wait_for(|s| s.is_logged_in(), Duration::from_millis(30))
                .await
        );
    }
}
