//! # docvec
//!
//! Convert PDF documents into vector embeddings for semantic search and
//! question answering.
//!
//! docvec extracts text from PDFs, splits it into retrievable chunks,
//! embeds each chunk into a fixed-dimension vector, stores the vectors in a
//! content-addressed index, and answers natural-language questions by
//! returning (and optionally composing an answer from) the most similar
//! chunks.
//!
//! ```text
//! ┌─────────┐   ┌──────────────┐   ┌─────────────┐   ┌────────────┐
//! │   PDF   │──▶│ Clean + Chunk │──▶│   Embed     │──▶│ VectorIndex │
//! └─────────┘   └──────────────┘   └─────────────┘   └─────┬──────┘
//!                                                          │
//!                              question ──▶ Embed ──▶ top-k ┘──▶ answer
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`clean`] | Extracted-text cleanup |
//! | [`chunk`] | Chunking strategies |
//! | [`embedding`] | Embedding provider abstraction |
//! | [`index`] | Content-addressed vector index |
//! | [`extract`] | PDF text extraction |
//! | [`chat`] | Answer composition client |
//! | [`pipeline`] | Ingestion and query orchestration |
//! | [`task`] | Single-slot background job |
//! | [`retry`] | Retry policy for remote calls |
//! | [`error`] | Typed error taxonomy |

pub mod chat;
pub mod chunk;
pub mod clean;
pub mod config;
pub mod embedding;
pub mod error;
pub mod extract;
pub mod index;
pub mod models;
pub mod pipeline;
pub mod retry;
pub mod task;
