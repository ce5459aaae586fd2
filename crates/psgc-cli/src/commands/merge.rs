//! `psgc merge` — combine a baseline with supplementary sources.

use std::path::PathBuf;

use anyhow::Context as _;
use psgc_ingest::pipeline::merge_sources;
use psgc_store_sqlite::SqliteStore;

use crate::settings::AppConfig;

pub async fn run(
  config: AppConfig,
  baseline: PathBuf,
  supplements: Vec<PathBuf>,
  apply: bool,
  json: bool,
) -> anyhow::Result<()> {
  let store = SqliteStore::open(&config.database)
    .await
    .with_context(|| {
      format!("failed to open store at {:?}", config.database)
    })?;

  let report = merge_sources(&store, &baseline, &supplements, apply)
    .await
    .context("merge failed")?;

  if json {
    println!("{}", serde_json::to_string_pretty(&report)?);
  } else {
    print!("{}", report.merge);
    if report.applied {
      println!("merged set written to {:?}", config.database);
    } else {
      println!("dry run, nothing written (use --apply)");
    }
  }
  Ok(())
}
