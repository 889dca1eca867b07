//! Storage abstraction for Lectern.
//!
//! The [`Store`] trait combines the source registry (documents and their
//! passage metadata) with the embedding store (the similarity index over
//! every passage of every document). The two are mutated together: a
//! document, its passages and their vectors become visible in one step, so
//! a concurrent query never sees vectors without metadata or the reverse.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use std::collections::HashSet;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{DocumentSummary, Passage, ScoredPassage};

/// A document ready to be registered: its name, full text, and one vector
/// per passage.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub name: String,
    pub text: String,
    pub passages: Vec<String>,
    pub vectors: Vec<Vec<f32>>,
}

/// Abstract corpus backend.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`register`](Store::register) | Atomically add a document, its passages and vectors |
/// | [`list_documents`](Store::list_documents) | All documents in upload order |
/// | [`documents`](Store::documents) | The subset of documents with the given IDs |
/// | [`passages_for`](Store::passages_for) | Passages owned by a set of documents |
/// | [`nearest`](Store::nearest) | Nearest passages to a query vector across the whole corpus |
/// | [`passage_count`](Store::passage_count) | Size of the corpus, in passages |
#[async_trait]
pub trait Store: Send + Sync {
    /// Register a document under a freshly generated ID.
    ///
    /// Passages receive global indices continuing from the current corpus
    /// size. Nothing is stored if any vector is rejected.
    async fn register(&self, doc: NewDocument) -> Result<DocumentSummary>;

    /// All documents in upload order.
    async fn list_documents(&self) -> Result<Vec<DocumentSummary>>;

    /// Documents whose ID is in `ids`, in upload order. Unknown IDs are
    /// ignored.
    async fn documents(&self, ids: &HashSet<String>) -> Result<Vec<DocumentSummary>>;

    /// Passages owned by any document in `ids`, in insertion order.
    async fn passages_for(&self, ids: &HashSet<String>) -> Result<Vec<Passage>>;

    /// The `k` passages nearest to `query` over the entire corpus, by
    /// increasing distance. `k` larger than the corpus is clamped.
    async fn nearest(&self, query: &[f32], k: usize) -> Result<Vec<ScoredPassage>>;

    /// Total number of indexed passages.
    async fn passage_count(&self) -> Result<usize>;
}
