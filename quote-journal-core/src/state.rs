//! Application state
//!
//! `AppState` is the single source of truth the view renders from. It is held
//! in a `watch` channel so front ends can re-render on every change; services
//! mutate it only through `StateStore::update`.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;

use crate::domain::{Favorite, JournalEntry, Quote, SavedQuote, SessionUser};

/// Everything the view needs
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AppState {
    /// Current session, mirrored from the identity provider
    pub session: Option<SessionUser>,
    /// Text in the quote box (the quote, or the fetch-failure message)
    pub quote_text: String,
    /// Last successfully fetched quote
    pub current_quote: Option<Quote>,
    /// Free-text journal input
    pub journal_draft: String,
    pub favorites: Vec<Favorite>,
    pub journal_entries: Vec<JournalEntry>,
    pub saved_quotes: Vec<SavedQuote>,
    /// Session-triggered refresh rounds still running
    pub sync_in_flight: usize,
}

impl AppState {
    pub fn is_logged_in(&self) -> bool {
        self.session.is_some()
    }

    /// Uid of the current session
    pub fn uid(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.uid.as_str())
    }

    /// Logged in and every session-triggered refresh has landed
    pub fn is_settled(&self) -> bool {
        self.session.is_some() && self.sync_in_flight == 0
    }

    /// Drop every list; used when the session ends
    pub fn clear_collections(&mut self) {
        self.favorites.clear();
        self.journal_entries.clear();
        self.saved_quotes.clear();
    }
}

/// Shared handle to the application state
#[derive(Debug, Clone)]
pub struct StateStore {
    tx: Arc<watch::Sender<AppState>>,
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(AppState::default());
        Self { tx: Arc::new(tx) }
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> AppState {
        self.tx.borrow().clone()
    }

    /// Read a value out of the current state without cloning all of it
    pub fn read<T>(&self, f: impl FnOnce(&AppState) -> T) -> T {
        f(&self.tx.borrow())
    }

    /// Apply a change and notify subscribers
    pub fn update(&self, f: impl FnOnce(&mut AppState)) {
        self.tx.send_modify(f);
    }

    /// Subscribe to state changes
    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.tx.subscribe()
    }
}
