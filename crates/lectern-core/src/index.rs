//! Append-only flat similarity index.
//!
//! Vectors are stored contiguously in one arena (row-major `f32` buffer),
//! one row per passage, in insertion order. Rows are never removed or
//! reordered. Alongside the arena the index keeps an explicit mapping
//! between passage IDs and rows in both directions, so lookups never rely
//! on two lists happening to line up.
//!
//! Search is exact brute force over every row by squared Euclidean
//! distance, which is the right trade-off for the small to medium corpora
//! a single in-memory process holds.
//!
//! # Mapping
//!
//! | Method | Direction |
//! |--------|-----------|
//! | [`row_of`](FlatIndex::row_of) | passage → row |
//! | [`passage_at`](FlatIndex::passage_at) | row → passage |
//! | [`vector`](FlatIndex::vector) | row → stored vector |
//!
//! Search results already carry both sides. These lookups are for callers
//! that rewrite the arena, such as tombstoning a removed document's
//! passages or compacting rows, and must keep the two directions in step.

use std::collections::HashMap;

use thiserror::Error;

use crate::embedding::squared_l2;

/// Errors raised by [`FlatIndex`] operations.
#[derive(Debug, Error, PartialEq)]
pub enum IndexError {
    #[error("vector dimension mismatch: index holds {expected}-d vectors, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("passage {0} already has a vector row")]
    DuplicatePassage(usize),
    #[error("zero-length vectors cannot be indexed")]
    EmptyVector,
}

/// One nearest-neighbour hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Row in the vector arena.
    pub row: usize,
    /// Passage the row belongs to.
    pub passage: usize,
    /// Squared Euclidean distance to the query.
    pub distance: f32,
}

/// Exact nearest-neighbour index over fixed-dimension vectors.
#[derive(Debug, Default)]
pub struct FlatIndex {
    /// Fixed by the constructor or by the first insert.
    dims: Option<usize>,
    arena: Vec<f32>,
    row_passage: Vec<usize>,
    passage_row: HashMap<usize, usize>,
}

impl FlatIndex {
    /// Create an empty index whose dimension is fixed by the first insert.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty index that only accepts `dims`-dimensional vectors.
    pub fn with_dims(dims: usize) -> Self {
        Self {
            dims: Some(dims),
            ..Self::default()
        }
    }

    /// Vector dimension, if known yet.
    pub fn dims(&self) -> Option<usize> {
        self.dims
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.row_passage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row_passage.is_empty()
    }

    /// Append one row per `(passage, vector)` entry, in the given order.
    ///
    /// Returns the row assigned to the first entry (the index size before
    /// the call). Either every entry is appended or none is.
    pub fn add(&mut self, entries: &[(usize, Vec<f32>)]) -> Result<usize, IndexError> {
        let start = self.len();
        let Some(first) = entries.first() else {
            return Ok(start);
        };

        let dims = match self.dims {
            Some(d) => d,
            None if first.1.is_empty() => return Err(IndexError::EmptyVector),
            None => first.1.len(),
        };
        for (passage, vector) in entries {
            if vector.len() != dims {
                return Err(IndexError::DimensionMismatch {
                    expected: dims,
                    actual: vector.len(),
                });
            }
            if self.passage_row.contains_key(passage) {
                return Err(IndexError::DuplicatePassage(*passage));
            }
        }

        self.dims = Some(dims);
        self.arena.reserve(entries.len() * dims);
        for (offset, (passage, vector)) in entries.iter().enumerate() {
            self.arena.extend_from_slice(vector);
            self.row_passage.push(*passage);
            self.passage_row.insert(*passage, start + offset);
        }

        Ok(start)
    }

    /// Row holding the vector of `passage`.
    pub fn row_of(&self, passage: usize) -> Option<usize> {
        self.passage_row.get(&passage).copied()
    }

    /// Passage owning `row`.
    pub fn passage_at(&self, row: usize) -> Option<usize> {
        self.row_passage.get(row).copied()
    }

    /// Vector stored at `row`.
    pub fn vector(&self, row: usize) -> Option<&[f32]> {
        let dims = self.dims?;
        self.arena.get(row * dims..(row + 1) * dims)
    }

    /// The `k` rows nearest to `query`, by increasing distance.
    ///
    /// `k` is clamped to the index size; ties are broken by row so results
    /// are deterministic.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>, IndexError> {
        let Some(dims) = self.dims else {
            return Ok(Vec::new());
        };
        if query.len() != dims {
            return Err(IndexError::DimensionMismatch {
                expected: dims,
                actual: query.len(),
            });
        }

        let mut neighbors: Vec<Neighbor> = self
            .arena
            .chunks_exact(dims)
            .zip(self.row_passage.iter())
            .enumerate()
            .map(|(row, (vector, &passage))| Neighbor {
                row,
                passage,
                distance: squared_l2(query, vector),
            })
            .collect();

        neighbors.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then(a.row.cmp(&b.row))
        });
        neighbors.truncate(k.min(self.len()));

        Ok(neighbors)
    }
}
