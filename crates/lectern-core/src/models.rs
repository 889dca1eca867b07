//! Core data models shared by the registry, the retriever and the composer.
//!
//! Documents own their passages. A passage's `global_index` is its
//! position in the corpus-wide similarity index; the index keeps an
//! explicit passage → row mapping so the two never have to be matched up
//! by list position.

use serde::Serialize;

/// An uploaded document: identity, display name and full extracted text.
///
/// Immutable once registered.
#[derive(Debug, Clone)]
pub struct Document {
    /// Unique token (UUID v4).
    pub id: String,
    /// Display name, usually the uploaded file name.
    pub name: String,
    /// Full extracted text.
    pub text: String,
    /// Number of passages the document was chunked into.
    pub passage_count: usize,
}

impl Document {
    /// Lightweight listing view without the document body.
    pub fn summary(&self) -> DocumentSummary {
        DocumentSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            passage_count: self.passage_count,
        }
    }
}

/// Listing entry for a registered document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentSummary {
    pub id: String,
    pub name: String,
    pub passage_count: usize,
}

/// A passage of a document's text, the unit of indexing and retrieval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Passage {
    /// Owning document ID.
    pub document_id: String,
    /// Position within the owning document (`0..passage_count`).
    pub index: usize,
    /// Corpus-wide passage identifier, assigned in insertion order.
    pub global_index: usize,
    /// Passage text.
    pub text: String,
}

/// A passage returned by a similarity search, with its distance to the query.
#[derive(Debug, Clone)]
pub struct ScoredPassage {
    pub passage: Passage,
    /// Squared Euclidean distance (lower is more similar).
    pub distance: f32,
}
