//! In-memory [`Store`] implementation.
//!
//! Documents, passage metadata and the similarity index live in a single
//! [`Corpus`] behind one `parking_lot::RwLock`. Registration holds the
//! write lock across "append vectors, append passages, append document",
//! and searches hold the read lock while resolving rows to passages.

use std::collections::HashSet;

use anyhow::{bail, Result};
use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::index::FlatIndex;
use crate::models::{Document, DocumentSummary, Passage, ScoredPassage};

use super::{NewDocument, Store};

#[derive(Default)]
struct Corpus {
    documents: Vec<Document>,
    /// Indexed by `Passage::global_index`.
    passages: Vec<Passage>,
    index: FlatIndex,
}

/// Process-local corpus store. Nothing survives a restart.
pub struct InMemoryStore {
    corpus: RwLock<Corpus>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            corpus: RwLock::new(Corpus::default()),
        }
    }

    /// A store whose index only accepts `dims`-dimensional vectors.
    pub fn with_dims(dims: usize) -> Self {
        Self {
            corpus: RwLock::new(Corpus {
                index: FlatIndex::with_dims(dims),
                ..Corpus::default()
            }),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn register(&self, doc: NewDocument) -> Result<DocumentSummary> {
        if doc.passages.is_empty() {
            bail!("document '{}' has no passages", doc.name);
        }
        if doc.passages.len() != doc.vectors.len() {
            bail!(
                "got {} vectors for {} passages of '{}'",
                doc.vectors.len(),
                doc.passages.len(),
                doc.name
            );
        }

        let id = Uuid::new_v4().to_string();
        let mut corpus = self.corpus.write();
        let start = corpus.passages.len();

        let entries: Vec<(usize, Vec<f32>)> = doc
            .vectors
            .into_iter()
            .enumerate()
            .map(|(i, v)| (start + i, v))
            .collect();
        corpus.index.add(&entries)?;

        let passage_count = doc.passages.len();
        for (i, text) in doc.passages.into_iter().enumerate() {
            corpus.passages.push(Passage {
                document_id: id.clone(),
                index: i,
                global_index: start + i,
                text,
            });
        }

        let document = Document {
            id,
            name: doc.name,
            text: doc.text,
            passage_count,
        };
        let summary = document.summary();
        corpus.documents.push(document);

        Ok(summary)
    }

    async fn list_documents(&self) -> Result<Vec<DocumentSummary>> {
        let corpus = self.corpus.read();
        Ok(corpus.documents.iter().map(Document::summary).collect())
    }

    async fn documents(&self, ids: &HashSet<String>) -> Result<Vec<DocumentSummary>> {
        let corpus = self.corpus.read();
        Ok(corpus
            .documents
            .iter()
            .filter(|d| ids.contains(&d.id))
            .map(Document::summary)
            .collect())
    }

    async fn passages_for(&self, ids: &HashSet<String>) -> Result<Vec<Passage>> {
        let corpus = self.corpus.read();
        Ok(corpus
            .passages
            .iter()
            .filter(|p| ids.contains(&p.document_id))
            .cloned()
            .collect())
    }

    async fn nearest(&self, query: &[f32], k: usize) -> Result<Vec<ScoredPassage>> {
        let corpus = self.corpus.read();
        let neighbors = corpus.index.search(query, k)?;
        let mut hits = Vec::with_capacity(neighbors.len());
        for n in neighbors {
            let Some(passage) = corpus.passages.get(n.passage) else {
                bail!("index row {} points at missing passage {}", n.row, n.passage);
            };
            hits.push(ScoredPassage {
                passage: passage.clone(),
                distance: n.distance,
            });
        }
        Ok(hits)
    }

    async fn passage_count(&self) -> Result<usize> {
        Ok(self.corpus.read().passages.len())
    }
}
