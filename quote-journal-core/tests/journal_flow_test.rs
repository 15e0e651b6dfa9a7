//! End-to-end tests for the journal flow
//!
//! These drive a whole `QuoteJournalContext` wired with the in-memory
//! adapters: mount, authenticate, save to every collection, log out.
//!
//! Run with: cargo test --test journal_flow_test

use std::sync::Arc;
use std::time::Duration;

use quote_journal_core::adapters::memory::{
    InMemoryDocumentStore, InMemoryIdentityProvider, StaticQuoteProvider,
};
use quote_journal_core::config::Config;
use quote_journal_core::domain::CollectionKind;
use quote_journal_core::ports::IdentityProvider;
use quote_journal_core::view::{Screen, NO_SAVED_QUOTES};
use quote_journal_core::{Error, Quote, QuoteFetch, QuoteJournalContext};

const WAIT: Duration = Duration::from_secs(5);

struct Harness {
    ctx: QuoteJournalContext,
    identity: Arc<InMemoryIdentityProvider>,
    store: Arc<InMemoryDocumentStore>,
}

fn harness() -> Harness {
    let identity = Arc::new(InMemoryIdentityProvider::new());
    let store = Arc::new(InMemoryDocumentStore::new());
    let quotes = Arc::new(StaticQuoteProvider::new(vec![
        Quote::new("Be water.", "Bruce Lee"),
        Quote::new("What we think, we become.", "Buddha"),
    ]));
    let ctx = QuoteJournalContext::from_adapters(
        Config::default(),
        identity.clone(),
        store.clone(),
        quotes,
    );
    Harness {
        ctx,
        identity,
        store,
    }
}

async fn log_in(h: &Harness, email: &str) -> String {
    let user = h.ctx.auth_service.sign_up(email, "secret1").await.unwrap();
    let uid = user.uid.clone();
    assert!(
        h.ctx
            .wait_for(|s| s.uid() == Some(uid.as_str()) && s.is_settled(), WAIT)
            .await,
        "session never settled"
    );
    user.uid
}

#[tokio::test]
async fn test_mount_fetches_quote_and_shows_login() {
    let mut h = harness();

    let outcome = h.ctx.mount().await;

    assert_eq!(outcome, QuoteFetch::Fetched(Quote::new("Be water.", "Bruce Lee")));
    assert!(h.ctx.is_mounted());
    assert_eq!(h.ctx.screen(), Screen::Login);
    assert_eq!(h.ctx.state.snapshot().quote_text, "Be water. — Bruce Lee");
}

#[tokio::test]
async fn test_full_session() {
    let mut h = harness();
    h.ctx.mount().await;
    let uid = log_in(&h, "reader@example.com").await;

    let Screen::Dashboard(dashboard) = h.ctx.screen() else {
        panic!("expected dashboard after login");
    };
    assert_eq!(dashboard.saved_quotes_placeholder(), Some(NO_SAVED_QUOTES));

    let receipt = h.ctx.collection_sync.save_quote().await.unwrap();
    assert_eq!(receipt.notice(), Some("Quote saved!"));
    assert_eq!(receipt.collection_size, 1);

    h.ctx.set_journal_draft("Stayed calm in traffic");
    let receipt = h.ctx.collection_sync.save_journal().await.unwrap();
    assert_eq!(receipt.notice(), Some("Journal entry saved!"));

    let receipt = h.ctx.collection_sync.save_favorite().await.unwrap();
    assert_eq!(receipt.notice(), None);

    let snapshot = h.ctx.state.snapshot();
    assert_eq!(snapshot.journal_draft, "");
    assert_eq!(snapshot.journal_entries[0].entry, "Stayed calm in traffic");
    assert_eq!(snapshot.journal_entries[0].quote, "Be water. — Bruce Lee");
    assert_eq!(snapshot.saved_quotes[0].author, "Bruce Lee");
    assert_eq!(snapshot.favorites[0].quote, "Be water. — Bruce Lee");

    let journal_docs = h.store.documents(&CollectionKind::Journals.path(&uid));
    assert_eq!(journal_docs.len(), 1);
    assert!(journal_docs[0].created_at.is_some());

    let Screen::Dashboard(dashboard) = h.ctx.screen() else {
        panic!("expected dashboard");
    };
    assert_eq!(dashboard.saved_quotes, vec!["\"Be water.\" — Bruce Lee"]);
    assert!(dashboard.journal[0].date_line.is_some());

    h.ctx.auth_service.log_out().await.unwrap();
    assert!(h.ctx.wait_for(|s| !s.is_logged_in(), WAIT).await);

    let snapshot = h.ctx.state.snapshot();
    assert_eq!(h.ctx.screen(), Screen::Login);
    assert!(snapshot.favorites.is_empty());
    assert!(snapshot.journal_entries.is_empty());
    assert!(snapshot.saved_quotes.is_empty());
}

#[tokio::test]
async fn test_guards_issue_no_writes() {
    let mut h = harness();
    h.ctx.mount().await;

    for result in [
        h.ctx.collection_sync.save_favorite().await,
        h.ctx.collection_sync.save_journal().await,
        h.ctx.collection_sync.save_quote().await,
    ] {
        let err = result.unwrap_err();
        assert!(matches!(err, Error::LoginRequired));
        assert_eq!(err.to_string(), "Please log in first!");
    }
    assert_eq!(h.store.write_count(), 0);
}

#[tokio::test]
async fn test_save_quote_without_current_quote() {
    let identity = Arc::new(InMemoryIdentityProvider::new());
    let store = Arc::new(InMemoryDocumentStore::new());
    let mut ctx = QuoteJournalContext::from_adapters(
        Config::default(),
        identity.clone(),
        store.clone(),
        Arc::new(StaticQuoteProvider::new(Vec::new())),
    );

    assert_eq!(ctx.mount().await, QuoteFetch::Fallback);
    assert_eq!(
        ctx.state.snapshot().quote_text,
        "Failed to fetch quote. Please try again."
    );

    ctx.auth_service.sign_up("reader@example.com", "secret1").await.unwrap();
    assert!(ctx.wait_for(|s| s.is_settled(), WAIT).await);

    let err = ctx.collection_sync.save_quote().await.unwrap_err();
    assert!(matches!(err, Error::NoQuoteToSave));
    assert_eq!(err.to_string(), "No quote to save!");
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn test_list_matches_store_after_write() {
    let mut h = harness();
    h.ctx.mount().await;
    let uid = log_in(&h, "reader@example.com").await;

    // Written by another client while this one was idle
    let path = CollectionKind::Favorites.path(&uid);
    h.store
        .insert_raw(&path, serde_json::json!({ "quote": "From elsewhere" }), None);
    h.store
        .insert_raw(&path, serde_json::json!({ "quote": "Also elsewhere" }), None);

    h.ctx.collection_sync.save_favorite().await.unwrap();

    let favorites = h.ctx.state.snapshot().favorites;
    assert_eq!(favorites.len(), h.store.documents(&path).len());
    assert_eq!(favorites.len(), 3);
    // Timestamped write first, untimed documents after it in store order
    assert_eq!(favorites[0].quote, "Be water. — Bruce Lee");
    assert_eq!(favorites[1].quote, "From elsewhere");
}

#[tokio::test]
async fn test_users_do_not_share_collections() {
    let mut h = harness();
    h.ctx.mount().await;

    log_in(&h, "first@example.com").await;
    h.ctx.collection_sync.save_favorite().await.unwrap();
    h.ctx.auth_service.log_out().await.unwrap();
    assert!(h.ctx.wait_for(|s| !s.is_logged_in(), WAIT).await);

    log_in(&h, "second@example.com").await;
    assert!(h.ctx.state.snapshot().favorites.is_empty());

    h.ctx.auth_service.log_out().await.unwrap();
    assert!(h.ctx.wait_for(|s| !s.is_logged_in(), WAIT).await);
    h.ctx
        .auth_service
        .log_in("first@example.com", "secret1")
        .await
        .unwrap();
    assert!(
        h.ctx
            .wait_for(|s| s.is_settled() && s.favorites.len() == 1, WAIT)
            .await
    );
}

#[tokio::test]
async fn test_store_failure_surfaces_as_store_error() {
    let mut h = harness();
    h.ctx.mount().await;
    log_in(&h, "reader@example.com").await;

    h.store.set_failing(true);
    let err = h.ctx.collection_sync.save_favorite().await.unwrap_err();
    assert!(matches!(err, Error::Store(_)));
    assert!(h.ctx.state.snapshot().is_logged_in());
}

#[tokio::test]
async fn test_unmount_stops_following_sessions() {
    let mut h = harness();
    h.ctx.mount().await;
    h.ctx.unmount();
    assert!(!h.ctx.is_mounted());

    h.identity
        .create_account("reader@example.com", "secret1")
        .await
        .unwrap();
    assert!(
        !h.ctx
            .wait_for(|s| s.is_logged_in(), Duration::from_millis(100))
            .await
    );
}

#[tokio::test]
async fn test_demo_context_from_config() {
    let mut config = Config::default();
    config.enable_demo_mode();
    let mut ctx = QuoteJournalContext::new(config).unwrap();

    assert_eq!(ctx.provider_name(), "demo");
    assert!(matches!(ctx.mount().await, QuoteFetch::Fetched(_)));
    ctx.auth_service.sign_up("demo@example.com", "secret1").await.unwrap();
    assert!(ctx.wait_for(|s| s.is_settled(), WAIT).await);
}

#[test]
fn test_firebase_context_needs_project() {
    let err = QuoteJournalContext::new(Config::default()).err().unwrap();
    assert!(err.to_string().contains("apiKey"));
}
