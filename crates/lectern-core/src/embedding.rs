//! Embedding provider trait and vector distance.
//!
//! Defines the [`Embedder`] trait that all embedding backends implement.
//! Concrete providers (local fastembed, OpenAI-compatible, Ollama) live in
//! the `lectern` app crate; the core only ever sees fixed-dimension
//! `Vec<f32>` outputs.

use anyhow::Result;
use async_trait::async_trait;

/// Trait for embedding providers.
///
/// Implementations must be deterministic for a fixed model and return one
/// vector per input text, in input order, each of length [`dims`](Embedder::dims).
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Returns the model identifier (e.g. `"all-minilm-l6-v2"`).
    fn model_name(&self) -> &str;
    /// Returns the embedding vector dimensionality (e.g. `384`).
    fn dims(&self) -> usize;
    /// Embed a batch of texts.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Embed a single query text.
///
/// Convenience wrapper around [`Embedder::embed`] for one-off queries.
pub async fn embed_query(embedder: &dyn Embedder, text: &str) -> Result<Vec<f32>> {
    let results = embedder.embed(&[text.to_string()]).await?;
    results
        .into_iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("Empty embedding response"))
}

/// Squared Euclidean distance between two vectors.
///
/// ```text
/// d(a, b) = Σ (aᵢ − bᵢ)²
/// ```
///
/// Callers are responsible for passing vectors of equal length; extra
/// components of the longer vector are ignored.
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_squared_l2_identical_is_zero() {
        let v = vec![1.0, -2.0, 3.5];
        assert_eq!(squared_l2(&v, &v), 0.0);
    }

    #[test]
    fn test_squared_l2_known_value() {
        let a = vec![0.0, 0.0];
        let b = vec![3.0, 4.0];
        assert!((squared_l2(&a, &b) - 25.0).abs() < 1e-6);
    }

    #[test]
    fn test_squared_l2_symmetric() {
        let a = vec![0.5, 1.5, -2.0];
        let b = vec![-1.0, 0.25, 4.0];
        assert!((squared_l2(&a, &b) - squared_l2(&b, &a)).abs() < 1e-6);
    }
}
