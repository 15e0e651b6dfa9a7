//! User-scoped collections and the records stored in them

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Field the document store fills with its server timestamp on write
pub const CREATED_AT_FIELD: &str = "createdAt";

/// The three per-user collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollectionKind {
    Favorites,
    Journals,
    SavedQuotes,
}

impl CollectionKind {
    pub const ALL: [CollectionKind; 3] = [
        CollectionKind::Favorites,
        CollectionKind::Journals,
        CollectionKind::SavedQuotes,
    ];

    /// Collection id as stored under `users/{uid}/`
    pub fn collection_id(&self) -> &'static str {
        match self {
            CollectionKind::Favorites => "favorites",
            CollectionKind::Journals => "journals",
            CollectionKind::SavedQuotes => "savedQuotes",
        }
    }

    /// Full collection path for a user, e.g. `users/abc/journals`
    pub fn path(&self, uid: &str) -> String {
        format!("users/{}/{}", uid, self.collection_id())
    }

    /// Human-readable name used in logs and messages
    pub fn label(&self) -> &'static str {
        match self {
            CollectionKind::Favorites => "favorites",
            CollectionKind::Journals => "journal entries",
            CollectionKind::SavedQuotes => "saved quotes",
        }
    }
}

/// A document as read back from the store
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub fields: Map<String, JsonValue>,
    /// Server-assigned creation time, absent if the field was never set
    pub created_at: Option<DateTime<Utc>>,
}

impl StoredDocument {
    /// String field value, empty when missing or not a string
    pub fn string_field(&self, name: &str) -> String {
        self.fields
            .get(name)
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string()
    }
}

/// A document to append, tagged by the collection it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewDocument {
    Favorite { quote: String },
    Journal { quote: String, entry: String },
    SavedQuote { quote: String, author: String },
}

impl NewDocument {
    pub fn kind(&self) -> CollectionKind {
        match self {
            NewDocument::Favorite { .. } => CollectionKind::Favorites,
            NewDocument::Journal { .. } => CollectionKind::Journals,
            NewDocument::SavedQuote { .. } => CollectionKind::SavedQuotes,
        }
    }

    /// Fields written to the store. `createdAt` is not included; the store
    /// assigns it.
    pub fn fields(&self) -> Map<String, JsonValue> {
        let mut fields = Map::new();
        match self {
            NewDocument::Favorite { quote } => {
                fields.insert("quote".to_string(), JsonValue::from(quote.as_str()));
            }
            NewDocument::Journal { quote, entry } => {
                fields.insert("quote".to_string(), JsonValue::from(quote.as_str()));
                fields.insert("entry".to_string(), JsonValue::from(entry.as_str()));
            }
            NewDocument::SavedQuote { quote, author } => {
                fields.insert("quote".to_string(), JsonValue::from(quote.as_str()));
                fields.insert("author".to_string(), JsonValue::from(author.as_str()));
            }
        }
        fields
    }
}

/// A record shape read from one collection
pub trait CollectionRecord: Sized + Clone + Send + 'static {
    const KIND: CollectionKind;

    fn from_document(doc: &StoredDocument) -> Self;

    fn created_at(&self) -> Option<DateTime<Utc>>;
}

/// Order records newest first. Records without a creation time go last;
/// ties keep the order the store returned them in.
pub fn sort_newest_first<R: CollectionRecord>(records: &mut [R]) {
    records.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favorite {
    pub id: String,
    pub quote: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl CollectionRecord for Favorite {
    const KIND: CollectionKind = CollectionKind::Favorites;

    fn from_document(doc: &StoredDocument) -> Self {
        Self {
            id: doc.id.clone(),
            quote: doc.string_field("quote"),
            created_at: doc.created_at,
        }
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: String,
    pub quote: String,
    pub entry: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl JournalEntry {
    /// Creation date in the local timezone
    pub fn local_date(&self) -> Option<NaiveDate> {
        self.created_at
            .map(|ts| ts.with_timezone(&Local).date_naive())
    }
}

impl CollectionRecord for JournalEntry {
    const KIND: CollectionKind = CollectionKind::Journals;

    fn from_document(doc: &StoredDocument) -> Self {
        Self {
            id: doc.id.clone(),
            quote: doc.string_field("quote"),
            entry: doc.string_field("entry"),
            created_at: doc.created_at,
        }
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedQuote {
    pub id: String,
    pub quote: String,
    pub author: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl CollectionRecord for SavedQuote {
    const KIND: CollectionKind = CollectionKind::SavedQuotes;

    fn from_document(doc: &StoredDocument) -> Self {
        Self {
            id: doc.id.clone(),
            quote: doc.string_field("quote"),
            author: doc.string_field("author"),
            created_at: doc.created_at,
        }
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
}
