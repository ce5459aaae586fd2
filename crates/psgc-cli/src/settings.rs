//! Runtime configuration, loaded from `psgc.toml` plus `PSGC_`-prefixed
//! environment variables.
//!
//! The reference standards table lives here so revised PSA figures are an
//! edit to the config file, not a rebuild.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use psgc_api::RateLimitConfig;
use psgc_core::standards::StandardsReference;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  /// Path to the SQLite database file.
  #[serde(default = "default_database")]
  pub database:   PathBuf,
  #[serde(default)]
  pub rate_limit: RateLimitConfig,
  /// Per-level expected counts and tolerances for `psgc validate`.
  #[serde(default)]
  pub standards:  StandardsReference,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 3000 }

fn default_database() -> PathBuf { PathBuf::from("psgc.db") }

pub fn load(path: &Path) -> anyhow::Result<AppConfig> {
  let settings = config::Config::builder()
    .add_source(config::File::from(path.to_path_buf()).required(false))
    .add_source(config::Environment::with_prefix("PSGC"))
    .build()
    .context("failed to read configuration")?;

  settings
    .try_deserialize()
    .context("failed to deserialise configuration")
}
