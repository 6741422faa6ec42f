//! Page store: ordered map of page key → document.
//!
//! Pages are created lazily on first reference and removed explicitly. The
//! map is a `BTreeMap` so that snapshot serialization and any cross-page
//! iteration happen in key order on every replica.

#[cfg(test)]
#[path = "pages_test.rs"]
mod pages_test;

use std::collections::BTreeMap;

use wire::PageKey;

use crate::doc::Document;

/// All pages of one board, keyed by page identifier.
#[derive(Debug)]
pub struct PageStore {
    pages: BTreeMap<PageKey, Document>,
}

impl PageStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self { pages: BTreeMap::new() }
    }

    /// Return the page for `key`, creating an empty one at the given
    /// dimensions when absent.
    pub fn get_or_create(&mut self, key: PageKey, width: u32, height: u32) -> &mut Document {
        self.pages.entry(key).or_insert_with(|| Document::new(key, width, height))
    }

    /// Look up a page without creating it.
    #[must_use]
    pub fn get(&self, key: PageKey) -> Option<&Document> {
        self.pages.get(&key)
    }

    /// Mutable lookup without creation.
    pub fn get_mut(&mut self, key: PageKey) -> Option<&mut Document> {
        self.pages.get_mut(&key)
    }

    /// Insert a fully-built page, replacing any existing one with the same key.
    pub fn insert(&mut self, document: Document) {
        self.pages.insert(document.key(), document);
    }

    /// Delete a page and all of its history. Returns the removed document.
    pub fn remove(&mut self, key: PageKey) -> Option<Document> {
        self.pages.remove(&key)
    }

    /// Whether a page exists for `key`.
    #[must_use]
    pub fn contains(&self, key: PageKey) -> bool {
        self.pages.contains_key(&key)
    }

    /// Pages in key order.
    pub fn iter(&self) -> impl Iterator<Item = (PageKey, &Document)> {
        self.pages.iter().map(|(&key, doc)| (key, doc))
    }

    /// Mutable pages in key order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (PageKey, &mut Document)> {
        self.pages.iter_mut().map(|(&key, doc)| (key, doc))
    }

    /// Number of pages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Returns `true` if no page exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

impl Default for PageStore {
    fn default() -> Self {
        Self::new()
    }
}
