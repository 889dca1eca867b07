//! # Lectern
//!
//! Ask questions about your PDFs.
//!
//! Lectern extracts the text of uploaded PDFs, splits it into passages,
//! embeds every passage into one shared similarity index, and answers
//! questions, writes summaries and builds quizzes from the passages of the
//! documents you select, delegating the writing to an OpenAI-compatible
//! language model.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────────┐   ┌────────────────────┐
//! │   PDF    │──▶│ Chunk+Embed  │──▶│ Store              │
//! │ extract  │   │              │   │ registry + index   │
//! └──────────┘   └──────────────┘   └─────────┬──────────┘
//!                                             │ retrieve + filter
//!                                             ▼
//!                 ┌──────────┐          ┌──────────┐      ┌─────┐
//!                 │ CLI/HTTP │◀─────────│ Compose  │─────▶│ LLM │
//!                 └──────────┘          └──────────┘      └─────┘
//! ```
//!
//! The algorithms (chunking, the flat index, retrieval, context budgets and
//! prompts) live in the `lectern-core` crate. This crate adds the concrete
//! backends and the surfaces.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`error`] | Error taxonomy for notebook operations |
//! | [`extract`] | PDF text extraction |
//! | [`embedding`] | Embedding backends (local, OpenAI, Ollama) |
//! | [`completion`] | Chat completion client |
//! | [`transcribe`] | Speech-to-text client |
//! | [`notebook`] | The service: ingest, ask, summarize, quiz |
//! | [`server`] | HTTP API |

pub mod completion;
pub mod config;
pub mod embedding;
pub mod error;
pub mod extract;
pub mod notebook;
pub mod server;
pub mod transcribe;
