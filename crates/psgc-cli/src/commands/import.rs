//! `psgc import` — run source files through the import pipeline.

use std::path::PathBuf;

use anyhow::Context as _;
use psgc_store_sqlite::SqliteStore;

use crate::settings::AppConfig;

pub async fn run(
  config: AppConfig,
  files: Vec<PathBuf>,
  json: bool,
) -> anyhow::Result<()> {
  let store = SqliteStore::open(&config.database)
    .await
    .with_context(|| {
      format!("failed to open store at {:?}", config.database)
    })?;

  for file in files {
    let report = psgc_ingest::import_file(&store, &file)
      .await
      .with_context(|| format!("import of {} failed", file.display()))?;
    if json {
      println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
      print!("{report}");
    }
  }
  Ok(())
}
