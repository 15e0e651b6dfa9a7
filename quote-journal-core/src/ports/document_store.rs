//! Document store port
//!
//! Namespaced document collections addressed by slash-separated paths such
//! as `users/{uid}/journals`.

use async_trait::async_trait;
use serde_json::{Map, Value as JsonValue};

use crate::domain::result::Result;
use crate::domain::StoredDocument;

/// Document store trait
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Add one document to a collection.
    ///
    /// The store assigns the document identifier and sets `createdAt` to its
    /// own clock. Returns the new identifier.
    async fn add_document(
        &self,
        collection_path: &str,
        fields: Map<String, JsonValue>,
    ) -> Result<String>;

    /// Read every document in a collection, in the store's default order
    async fn query_all(&self, collection_path: &str) -> Result<Vec<StoredDocument>>;
}
