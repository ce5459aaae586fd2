//! Ingestion front-ends and the import pipeline for the PSGC gazetteer.
//!
//! Heterogeneous source files (CSV, JSON, Excel) are flattened into
//! [`psgc_core::record::RawRecord`] field maps; past that boundary the
//! pipeline is format-agnostic:
//!
//! ```text
//! file → read_records → classify → reconcile → store.upsert_batch
//! ```
//!
//! Per-record failures are logged and tallied, never fatal to a batch. A
//! store write failure after reconciliation means a hierarchy invariant
//! was violated and fails the whole run.

pub mod error;
pub mod pipeline;
pub mod reader;

pub use error::{Error, Result};
pub use pipeline::{ImportReport, import_file};
pub use reader::read_records;
