//! Location-keyed document cache.
//!
//! The store owns every parsed [`Document`] of a session. Fetched documents
//! and schemas embedded in a parent document live in separate tables; a
//! location present in the inline table is never fetched on its own.
//! There is no eviction: the store lives as long as its session.

use crate::document::{Document, SchemaDocument};
use crate::location::Location;
use std::collections::BTreeMap;

/// Parsed documents keyed by their final location.
#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
    documents: BTreeMap<Location, Document>,
    inline: BTreeMap<Location, SchemaDocument>,
}

impl DocumentStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The fetched document at `location`.
    #[must_use]
    pub fn get(&self, location: &Location) -> Option<&Document> {
        self.documents.get(location)
    }

    /// Store `document` at `location`, returning any document it replaced.
    pub fn put(&mut self, location: Location, document: Document) -> Option<Document> {
        self.documents.insert(location, document)
    }

    /// Whether a fetched document exists at `location`.
    #[must_use]
    pub fn contains(&self, location: &Location) -> bool {
        self.documents.contains_key(location)
    }

    /// Remove the fetched document at `location`.
    pub fn remove(&mut self, location: &Location) -> Option<Document> {
        self.documents.remove(location)
    }

    /// The inline schema registered under `location`.
    #[must_use]
    pub fn get_inline(&self, location: &Location) -> Option<&SchemaDocument> {
        self.inline.get(location)
    }

    /// Register a schema embedded in a parent document.
    pub fn put_inline(&mut self, location: Location, schema: SchemaDocument) {
        self.inline.insert(location, schema);
    }

    /// Whether `location` names an inline schema.
    #[must_use]
    pub fn is_inline(&self, location: &Location) -> bool {
        self.inline.contains_key(location)
    }

    /// Number of fetched documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether no document has been fetched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Number of inline schemas.
    #[must_use]
    pub fn inline_len(&self) -> usize {
        self.inline.len()
    }

    /// Fetched documents in location order.
    pub fn iter(&self) -> impl Iterator<Item = (&Location, &Document)> {
        self.documents.iter()
    }

    /// Inline schemas in location order.
    pub fn inline_iter(&self) -> impl Iterator<Item = (&Location, &SchemaDocument)> {
        self.inline.iter()
    }

    /// Drop every document and inline schema.
    pub fn clear(&mut self) {
        self.documents.clear();
        self.inline.clear();
    }
}
