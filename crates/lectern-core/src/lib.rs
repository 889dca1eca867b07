//! # Lectern Core
//!
//! Shared, I/O-free logic for Lectern: data models, passage chunking, the
//! flat similarity index, the corpus store abstraction, retrieval with
//! source filtering, and prompt composition.
//!
//! This crate contains no tokio, HTTP, PDF or filesystem dependencies.
//! Embedding and completion backends are plugged in through the
//! [`embedding::Embedder`] and [`completion::Completer`] traits.

pub mod chunk;
pub mod completion;
pub mod compose;
pub mod embedding;
pub mod index;
pub mod models;
pub mod retrieve;
pub mod store;
