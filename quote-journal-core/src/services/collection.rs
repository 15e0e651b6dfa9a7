//! Collection sync - append a document, then re-read the whole collection
//!
//! All three collections (favorites, journal entries, saved quotes) share one
//! write path and one read path. Lists in the application state are only ever
//! replaced by a full re-read, never patched locally.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::result::{Error, Result};
use crate::domain::{
    sort_newest_first, CollectionKind, CollectionRecord, Favorite, JournalEntry, NewDocument,
    SavedQuote,
};
use crate::ports::DocumentStore;
use crate::state::{AppState, StateStore};

/// Where each record type lives in the application state
trait StateSlot: CollectionRecord {
    fn slot(state: &mut AppState) -> &mut Vec<Self>;
}

impl StateSlot for Favorite {
    fn slot(state: &mut AppState) -> &mut Vec<Self> {
        &mut state.favorites
    }
}

impl StateSlot for JournalEntry {
    fn slot(state: &mut AppState) -> &mut Vec<Self> {
        &mut state.journal_entries
    }
}

impl StateSlot for SavedQuote {
    fn slot(state: &mut AppState) -> &mut Vec<Self> {
        &mut state.saved_quotes
    }
}

/// Outcome of a successful save
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveReceipt {
    pub kind: CollectionKind,
    pub document_id: String,
    /// Number of records in the collection after the re-read
    pub collection_size: usize,
}

impl SaveReceipt {
    /// Notice shown to the user after the save, if any
    pub fn notice(&self) -> Option<&'static str> {
        match self.kind {
            CollectionKind::Favorites => None,
            CollectionKind::Journals => Some("Journal entry saved!"),
            CollectionKind::SavedQuotes => Some("Quote saved!"),
        }
    }
}

/// Collection sync service
#[derive(Clone)]
pub struct CollectionSync {
    store: Arc<dyn DocumentStore>,
    state: StateStore,
}

impl CollectionSync {
    pub fn new(store: Arc<dyn DocumentStore>, state: StateStore) -> Self {
        Self { store, state }
    }

    /// Save the displayed quote text as a favorite
    pub async fn save_favorite(&self) -> Result<SaveReceipt> {
        let (uid, quote) = self
            .state
            .read(|s| (s.uid().map(str::to_string), s.quote_text.clone()));
        let uid = uid.ok_or(Error::LoginRequired)?;

        self.append_then_refresh(&uid, NewDocument::Favorite { quote })
            .await
    }

    /// Save the journal draft together with the displayed quote text.
    /// The draft is cleared once the write succeeds.
    pub async fn save_journal(&self) -> Result<SaveReceipt> {
        let (uid, quote, entry) = self.state.read(|s| {
            (
                s.uid().map(str::to_string),
                s.quote_text.clone(),
                s.journal_draft.clone(),
            )
        });
        let uid = uid.ok_or(Error::LoginRequired)?;

        let document = NewDocument::Journal { quote, entry };
        let document_id = self.append(&uid, &document).await?;
        self.state.update(|s| s.journal_draft.clear());
        let collection_size = self.refresh(CollectionKind::Journals, &uid).await?;

        Ok(SaveReceipt {
            kind: CollectionKind::Journals,
            document_id,
            collection_size,
        })
    }

    /// Save the current quote and its author
    pub async fn save_quote(&self) -> Result<SaveReceipt> {
        let (uid, current) = self
            .state
            .read(|s| (s.uid().map(str::to_string), s.current_quote.clone()));
        let uid = uid.ok_or(Error::LoginRequired)?;
        let current = current.ok_or(Error::NoQuoteToSave)?;

        self.append_then_refresh(
            &uid,
            NewDocument::SavedQuote {
                quote: current.quote,
                author: current.author,
            },
        )
        .await
    }

    /// Add one document to the user's collection, then re-read that collection
    pub async fn append_then_refresh(&self, uid: &str, document: NewDocument) -> Result<SaveReceipt> {
        let kind = document.kind();
        let document_id = self.append(uid, &document).await?;
        let collection_size = self.refresh(kind, uid).await?;

        Ok(SaveReceipt {
            kind,
            document_id,
            collection_size,
        })
    }

    async fn append(&self, uid: &str, document: &NewDocument) -> Result<String> {
        let kind = document.kind();
        let path = kind.path(uid);

        match self.store.add_document(&path, document.fields()).await {
            Ok(id) => {
                info!(collection = kind.collection_id(), document_id = %id, "Document added");
                Ok(id)
            }
            Err(e) => {
                warn!(collection = kind.collection_id(), error = %e, "Failed to add document");
                Err(e)
            }
        }
    }

    /// Re-read one collection and replace its list. Returns the record count.
    pub async fn refresh(&self, kind: CollectionKind, uid: &str) -> Result<usize> {
        match kind {
            CollectionKind::Favorites => self.refresh_records::<Favorite>(uid).await,
            CollectionKind::Journals => self.refresh_records::<JournalEntry>(uid).await,
            CollectionKind::SavedQuotes => self.refresh_records::<SavedQuote>(uid).await,
        }
    }

    /// Re-read all three collections concurrently.
    ///
    /// Each failure is logged; the first one is returned after all three
    /// reads have finished.
    pub async fn refresh_all(&self, uid: &str) -> Result<()> {
        let (favorites, journals, saved) = tokio::join!(
            self.refresh(CollectionKind::Favorites, uid),
            self.refresh(CollectionKind::Journals, uid),
            self.refresh(CollectionKind::SavedQuotes, uid),
        );

        let mut first_error = None;
        for (kind, result) in CollectionKind::ALL.into_iter().zip([favorites, journals, saved]) {
            if let Err(e) = result {
                warn!(collection = kind.collection_id(), error = %e, "Failed to refresh {}", kind.label());
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn refresh_records<R: StateSlot>(&self, uid: &str) -> Result<usize> {
        let documents = self.store.query_all(&R::KIND.path(uid)).await?;

        let mut records: Vec<R> = documents.iter().map(R::from_document).collect();
        sort_newest_first(&mut records);
        let count = records.len();

        self.state.update(|s| {
            // A read that outlived its session must not repopulate the lists
            if s.uid() == Some(uid) {
                *R::slot(s) = records;
            } else {
                debug!(collection = R::KIND.collection_id(), "Discarding refresh for a stale session");
            }
        });

        Ok(count)
    }
}
