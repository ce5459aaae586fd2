//! The `GeoStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g.
//! `psgc-store-sqlite`). Higher layers (`psgc-api`, `psgc-ingest`,
//! `psgc-cli`) depend on this abstraction, not on any concrete backend.
//!
//! Writes are upsert-by-code (last import wins) and must arrive
//! parents-first — the backend enforces foreign keys, and reconciler
//! output is already in that order. Nothing here deletes; a full rebuild
//! is the only deletion path.

use std::collections::BTreeMap;
use std::future::Future;

use crate::{
  code::GeographicCode,
  entity::{Entity, Level},
  reconcile::ExistingCodes,
};

// ─── Query types ─────────────────────────────────────────────────────────────

/// Restrict a listing to descendants of one ancestor. The ancestor's
/// level decides which parent column is filtered, which is what lets a
/// barangay listing distinguish a city parent from a municipality parent
/// sharing the same code prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AncestorFilter {
  pub level: Level,
  pub code:  GeographicCode,
}

/// Parameters for [`GeoStore::search`].
#[derive(Debug, Clone)]
pub struct SearchQuery {
  /// Substring matched against entity names, case-insensitively.
  pub text:  String,
  /// Restrict to one level.
  pub level: Option<Level>,
  pub limit: Option<usize>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a gazetteer storage backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait GeoStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Writes (import pipeline only) ─────────────────────────────────────

  /// Insert or replace one entity by code.
  fn upsert(
    &self,
    entity: Entity,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Write a dependency-ordered batch. A failure here after
  /// reconciliation means a hierarchy invariant was violated and must
  /// fail the import run.
  fn upsert_batch(
    &self,
    entities: Vec<Entity>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  fn exists(
    &self,
    level: Level,
    code: GeographicCode,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Fetch one entity at a known level. Returns `None` if absent.
  fn get(
    &self,
    level: Level,
    code: GeographicCode,
  ) -> impl Future<Output = Result<Option<Entity>, Self::Error>> + Send + '_;

  /// Fetch by code alone. For the shared city/municipality shape the
  /// city table is consulted first.
  fn find(
    &self,
    code: GeographicCode,
  ) -> impl Future<Output = Result<Option<Entity>, Self::Error>> + Send + '_;

  /// List one level in code order, optionally restricted to descendants
  /// of an ancestor.
  fn list(
    &self,
    level: Level,
    ancestor: Option<AncestorFilter>,
  ) -> impl Future<Output = Result<Vec<Entity>, Self::Error>> + Send + '_;

  /// Substring name search across levels.
  fn search(
    &self,
    query: SearchQuery,
  ) -> impl Future<Output = Result<Vec<Entity>, Self::Error>> + Send + '_;

  /// Entity counts per level, for standards validation.
  fn counts(
    &self,
  ) -> impl Future<Output = Result<BTreeMap<Level, u64>, Self::Error>> + Send + '_;

  /// Every persisted code per parent level, for seeding reconciliation.
  fn existing_codes(
    &self,
  ) -> impl Future<Output = Result<ExistingCodes, Self::Error>> + Send + '_;
}
