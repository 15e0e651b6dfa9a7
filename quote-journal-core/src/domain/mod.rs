//! Core domain entities
//!
//! All entities are defined here. These are pure data structures with
//! decoding and ordering logic - no I/O or external dependencies.

mod collection;
mod quote;
mod session;
pub mod result;

pub use collection::{
    sort_newest_first, CollectionKind, CollectionRecord, Favorite, JournalEntry, NewDocument,
    SavedQuote, StoredDocument, CREATED_AT_FIELD,
};
pub use quote::{decode_relay_envelope, Quote, QuoteDecodeError, QUOTE_FETCH_FAILED};
pub use session::SessionUser;
