//! Passage retrieval with source filtering.
//!
//! The corpus has a single similarity index shared by every document, so
//! retrieval searches broadly and filters afterwards:
//!
//! 1. Collect the passages owned by the selected documents. An empty
//!    collection is an error ([`RetrieveError::EmptySelection`]).
//! 2. Embed the question.
//! 3. Ask the store for the `min(max_candidates, |eligible|)` nearest
//!    passages across the whole corpus.
//! 4. Walk the neighbours by increasing distance, keeping those that are
//!    eligible, until `max_results` are kept or the list runs out.
//!
//! Keeping nothing is a normal outcome (an empty `Vec`), not an error.

use std::collections::HashSet;

use thiserror::Error;
use tracing::debug;

use crate::embedding::{embed_query, Embedder};
use crate::models::ScoredPassage;
use crate::store::Store;

/// Retrieval tuning parameters, decoupled from application config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrieveParams {
    /// Neighbours fetched from the index before filtering.
    pub max_candidates: usize,
    /// Passages kept after filtering.
    pub max_results: usize,
}

impl Default for RetrieveParams {
    fn default() -> Self {
        Self {
            max_candidates: 20,
            max_results: 8,
        }
    }
}

/// Bundles all inputs for a single retrieval.
#[derive(Debug, Clone)]
pub struct RetrieveRequest<'a> {
    /// Natural-language question.
    pub question: &'a str,
    /// IDs of the documents whose passages may be returned.
    pub allowed: &'a HashSet<String>,
    pub params: RetrieveParams,
}

#[derive(Debug, Error)]
pub enum RetrieveError {
    #[error("no passages belong to the selected documents")]
    EmptySelection,
    #[error("embedding failed: {0}")]
    Embedding(anyhow::Error),
    #[error("store error: {0}")]
    Store(anyhow::Error),
}

/// Retrieve the passages most relevant to `req.question`, restricted to
/// `req.allowed`, ordered by increasing distance.
pub async fn retrieve<S: Store + ?Sized>(
    store: &S,
    embedder: &dyn Embedder,
    req: &RetrieveRequest<'_>,
) -> Result<Vec<ScoredPassage>, RetrieveError> {
    let eligible = store
        .passages_for(req.allowed)
        .await
        .map_err(RetrieveError::Store)?;
    if eligible.is_empty() {
        return Err(RetrieveError::EmptySelection);
    }

    let query = embed_query(embedder, req.question)
        .await
        .map_err(RetrieveError::Embedding)?;

    let k = req.params.max_candidates.min(eligible.len());
    let neighbors = store
        .nearest(&query, k)
        .await
        .map_err(RetrieveError::Store)?;
    let candidates = neighbors.len();

    let eligible_rows: HashSet<usize> = eligible.iter().map(|p| p.global_index).collect();
    let kept: Vec<ScoredPassage> = neighbors
        .into_iter()
        .filter(|hit| eligible_rows.contains(&hit.passage.global_index))
        .take(req.params.max_results)
        .collect();

    debug!(
        eligible = eligible.len(),
        candidates,
        kept = kept.len(),
        "retrieval finished"
    );

    Ok(kept)
}
