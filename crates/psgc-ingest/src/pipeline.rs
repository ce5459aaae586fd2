//! The import pipeline: classify → reconcile → write-through.
//!
//! Rejected records never abort a batch; they are logged with enough
//! context (code, name, source row) to find them in the original file.
//! A store failure after reconciliation is a hard failure of the run —
//! it means reconciliation let a hierarchy invariant through.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use psgc_core::{
  classify::{Classifier, CivilDivisionResolver, RejectReason},
  entity::{Entity, Level},
  merge::{MergeReport, merge},
  reconcile::{ReconcileReport, reconcile},
  record::{Field, RawRecord},
  store::GeoStore,
};

use crate::{Error, Result, reader};

// ─── Reports ─────────────────────────────────────────────────────────────────

/// One record excluded from a batch, with its position in the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedRecord {
  /// Zero-based record position in the source file (header row
  /// excluded).
  pub index:  usize,
  pub code:   Option<String>,
  pub name:   Option<String>,
  #[serde(flatten)]
  pub reason: RejectReason,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
  pub source:       String,
  pub started_at:   DateTime<Utc>,
  pub finished_at:  DateTime<Utc>,
  pub records_read: usize,
  pub rejected:     Vec<RejectedRecord>,
  pub reconcile:    ReconcileReport,
}

impl fmt::Display for ImportReport {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(
      f,
      "{}: {} records read, {} rejected",
      self.source,
      self.records_read,
      self.rejected.len()
    )?;
    for (level, tally) in &self.reconcile.0 {
      writeln!(
        f,
        "  {level}: {} created, {} synthesized, {} duplicates",
        tally.created, tally.synthesized, tally.duplicates
      )?;
    }
    for rejected in &self.rejected {
      writeln!(
        f,
        "  ! row {}: {} (code={:?}, name={:?})",
        rejected.index, rejected.reason, rejected.code, rejected.name
      )?;
    }
    Ok(())
  }
}

/// Outcome of a baseline-plus-supplements merge run.
#[derive(Debug, Clone, Serialize)]
pub struct MergeRunReport {
  pub baseline:   String,
  pub merge:      MergeReport,
  pub rejected:   Vec<RejectedRecord>,
  /// Whether the merged set was written to the store.
  pub applied:    bool,
}

// ─── Classification over a batch ─────────────────────────────────────────────

/// Classify a batch of raw records, splitting entities from rejections.
pub fn classify_batch<R: CivilDivisionResolver>(
  records: &[RawRecord],
  classifier: &Classifier<R>,
) -> (Vec<Entity>, Vec<RejectedRecord>) {
  let mut entities = Vec::with_capacity(records.len());
  let mut rejected = Vec::new();

  for (index, record) in records.iter().enumerate() {
    match classifier.classify(record) {
      Ok(entity) => entities.push(entity),
      Err(reason) => {
        let code = record.get(Field::Code).map(str::to_string);
        let name = record.get(Field::Name).map(str::to_string);
        warn!(index, ?code, ?name, %reason, "record rejected");
        rejected.push(RejectedRecord { index, code, name, reason });
      }
    }
  }

  (entities, rejected)
}

/// Count classified entities per level, for validating a raw file
/// against the reference standards without touching the store.
pub fn count_levels(entities: &[Entity]) -> BTreeMap<Level, u64> {
  let mut counts = BTreeMap::new();
  for entity in entities {
    *counts.entry(entity.level()).or_insert(0) += 1;
  }
  counts
}

// ─── Import ──────────────────────────────────────────────────────────────────

/// Import one source file into the store.
pub async fn import_file<S: GeoStore>(
  store: &S,
  path: &Path,
) -> Result<ImportReport> {
  let started_at = Utc::now();
  let records = reader::read_records(path)?;
  let classifier = Classifier::new();
  let (entities, rejected) = classify_batch(&records, &classifier);

  let existing = store.existing_codes().await.map_err(store_error)?;
  let batch = reconcile(entities, &existing)?;

  store
    .upsert_batch(batch.entities)
    .await
    .map_err(store_error)?;

  let report = ImportReport {
    source:       path.display().to_string(),
    started_at,
    finished_at:  Utc::now(),
    records_read: records.len(),
    rejected,
    reconcile:    batch.report,
  };
  info!(
    source = %report.source,
    read = report.records_read,
    rejected = report.rejected.len(),
    synthesized = report.reconcile.synthesized_total(),
    "import finished"
  );
  Ok(report)
}

/// Merge a baseline file with supplementary files; baseline wins on
/// every overlapping code. With `apply` the merged set is written
/// through, otherwise this is a dry run.
pub async fn merge_sources<S: GeoStore>(
  store: &S,
  baseline_path: &Path,
  supplement_paths: &[PathBuf],
  apply: bool,
) -> Result<MergeRunReport> {
  let classifier = Classifier::new();
  let mut existing = store.existing_codes().await.map_err(store_error)?;

  let baseline_records = reader::read_records(baseline_path)?;
  let (baseline_entities, mut rejected) =
    classify_batch(&baseline_records, &classifier);
  let baseline = reconcile(baseline_entities, &existing)?;
  existing.absorb(&baseline.entities);

  let mut supplements = Vec::with_capacity(supplement_paths.len());
  for path in supplement_paths {
    let records = reader::read_records(path)?;
    let (entities, mut supplement_rejected) =
      classify_batch(&records, &classifier);
    rejected.append(&mut supplement_rejected);
    // Reconciled against baseline + store so a supplement never
    // re-synthesizes an ancestor the baseline already carries.
    let batch = reconcile(entities, &existing)?;
    existing.absorb(&batch.entities);
    supplements.push(batch.entities);
  }

  let outcome = merge(baseline.entities, supplements);
  if apply {
    store
      .upsert_batch(outcome.entities)
      .await
      .map_err(store_error)?;
  }

  Ok(MergeRunReport {
    baseline: baseline_path.display().to_string(),
    merge: outcome.report,
    rejected,
    applied: apply,
  })
}

fn store_error<E>(error: E) -> Error
where
  E: std::error::Error + Send + Sync + 'static,
{
  Error::Store(Box::new(error))
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::io::Write as _;

  use psgc_core::store::{GeoStore, SearchQuery};
  use psgc_store_sqlite::SqliteStore;

  use super::*;

  fn temp_file(name: &str, content: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    (dir, path)
  }

  const BASELINE_CSV: &str = "\
code,name,city_class
130000000,National Capital Region,
137400000,NCR First District,
137401000,City of Manila,HUC
137401001,Barangay 1,
";

  #[tokio::test]
  async fn import_writes_classified_records_through() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let (_dir, path) = temp_file("baseline.csv", BASELINE_CSV);

    let report = import_file(&store, &path).await.unwrap();
    assert_eq!(report.records_read, 4);
    assert!(report.rejected.is_empty());
    assert_eq!(report.reconcile.tally(Level::City).created, 1);
    assert_eq!(report.reconcile.synthesized_total(), 0);

    let counts = store.counts().await.unwrap();
    assert_eq!(counts.get(&Level::Barangay), Some(&1));
  }

  #[tokio::test]
  async fn rejected_rows_keep_their_source_position() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let csv = "\
code,name
130000000,NCR
,Nameless Place
000000000,Null Island
";
    let (_dir, path) = temp_file("partial.csv", csv);

    let report = import_file(&store, &path).await.unwrap();
    assert_eq!(report.records_read, 3);
    assert_eq!(report.rejected.len(), 2);
    assert_eq!(report.rejected[0].index, 1);
    assert_eq!(report.rejected[0].reason, RejectReason::MissingCode);
    assert_eq!(report.rejected[1].index, 2);
    assert!(matches!(
      report.rejected[1].reason,
      RejectReason::InvalidCode { .. }
    ));

    // The good row still landed.
    let counts = store.counts().await.unwrap();
    assert_eq!(counts.get(&Level::Region), Some(&1));
  }

  #[tokio::test]
  async fn import_is_upsert_on_reimport() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let (_dir, path) = temp_file("baseline.csv", BASELINE_CSV);

    import_file(&store, &path).await.unwrap();
    let second = import_file(&store, &path).await.unwrap();

    assert_eq!(second.reconcile.synthesized_total(), 0);
    let counts = store.counts().await.unwrap();
    assert_eq!(counts.values().sum::<u64>(), 4);
  }

  #[tokio::test]
  async fn merge_dry_run_reports_without_writing() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let (_dir, baseline) = temp_file("baseline.csv", BASELINE_CSV);
    let supplement_json = r#"[
      {"code": "137401000", "name": "Manila (supplement spelling)"},
      {"code": "137401002", "name": "Barangay 2"}
    ]"#;
    let (_dir2, supplement) = temp_file("extra.json", supplement_json);

    let report =
      merge_sources(&store, &baseline, &[supplement], false).await.unwrap();

    assert!(!report.applied);
    assert_eq!(report.merge.overlaps, 1);
    assert_eq!(report.merge.missing_in_baseline.len(), 1);
    assert_eq!(
      report.merge.missing_in_baseline[0].code.as_str(),
      "137401002"
    );
    // Dry run: nothing written.
    let counts = store.counts().await.unwrap();
    assert_eq!(counts.values().sum::<u64>(), 0);
  }

  #[tokio::test]
  async fn merge_apply_keeps_baseline_and_adds_the_rest() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let (_dir, baseline) = temp_file("baseline.csv", BASELINE_CSV);
    let supplement_json = r#"[
      {"code": "137401000", "name": "Manila (supplement spelling)"},
      {"code": "137401002", "name": "Barangay 2"}
    ]"#;
    let (_dir2, supplement) = temp_file("extra.json", supplement_json);

    merge_sources(&store, &baseline, &[supplement], true).await.unwrap();

    let manila = store
      .search(SearchQuery {
        text:  "manila".to_string(),
        level: Some(Level::City),
        limit: None,
      })
      .await
      .unwrap();
    assert_eq!(manila.len(), 1);
    assert_eq!(manila[0].name(), "City of Manila");

    let counts = store.counts().await.unwrap();
    assert_eq!(counts.get(&Level::Barangay), Some(&2));
  }

  #[test]
  fn count_levels_tallies_classified_entities() {
    let classifier = Classifier::new();
    let records = vec![
      RawRecord::from_pairs([("code", "130000000"), ("name", "NCR")]),
      RawRecord::from_pairs([("code", "042111001"), ("name", "Poblacion")]),
      RawRecord::from_pairs([("code", "042111002"), ("name", "San Roque")]),
    ];
    let (entities, rejected) = classify_batch(&records, &classifier);
    assert!(rejected.is_empty());

    let counts = count_levels(&entities);
    assert_eq!(counts.get(&Level::Region), Some(&1));
    assert_eq!(counts.get(&Level::Barangay), Some(&2));
  }
}
