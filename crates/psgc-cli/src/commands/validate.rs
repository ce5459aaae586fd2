//! `psgc validate` — compare counts against the reference standards.
//!
//! Counts come from the persisted store by default, or from a raw source
//! file with `--file`. Discrepancies are findings, never errors; the
//! exit code is zero either way.

use std::path::PathBuf;

use anyhow::Context as _;
use psgc_core::{
  classify::Classifier,
  store::GeoStore as _,
};
use psgc_ingest::pipeline::{classify_batch, count_levels};
use psgc_store_sqlite::SqliteStore;

use crate::settings::AppConfig;

pub async fn run(
  config: AppConfig,
  file: Option<PathBuf>,
  json: bool,
) -> anyhow::Result<()> {
  let counts = match file {
    Some(path) => {
      let records = psgc_ingest::read_records(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
      let (entities, rejected) =
        classify_batch(&records, &Classifier::new());
      if !rejected.is_empty() {
        tracing::warn!(
          rejected = rejected.len(),
          "records excluded from the count"
        );
      }
      count_levels(&entities)
    }
    None => {
      let store = SqliteStore::open(&config.database)
        .await
        .with_context(|| {
          format!("failed to open store at {:?}", config.database)
        })?;
      store.counts().await.context("failed to count entities")?
    }
  };

  let findings = config.standards.validate(&counts);
  if json {
    println!("{}", serde_json::to_string_pretty(&findings)?);
  } else if findings.is_empty() {
    println!("no reference standards configured");
  } else {
    for finding in &findings {
      println!("{finding}");
    }
  }
  Ok(())
}
