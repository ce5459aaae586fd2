//! Core types and the classification engine for the PSGC gazetteer.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.
//!
//! The pipeline over one import batch reads left to right:
//!
//! ```text
//! RawRecord → classify → Entity → reconcile → ReconciledBatch → merge → validate
//! ```
//!
//! Everything here is pure, synchronous transformation over in-memory
//! collections; I/O lives in the store backends and ingestion front-ends.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod classify;
pub mod code;
pub mod entity;
pub mod error;
pub mod merge;
pub mod reconcile;
pub mod record;
pub mod standards;
pub mod store;

pub use error::{Error, Result};
