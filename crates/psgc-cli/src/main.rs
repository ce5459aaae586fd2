//! The `psgc` binary.
//!
//! Subcommands cover the full lifecycle: `import` source files into the
//! store, `merge` a baseline with supplementary fetches, `validate`
//! counts against the configured PSA reference figures, `inspect` a
//! single code, and `serve` the read-only REST API.

mod commands;
mod settings;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Philippine Standard Geographic Code gazetteer")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "psgc.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Serve the read-only REST API.
  Serve,
  /// Import one or more source files (CSV, JSON, or Excel).
  Import {
    /// Source files, imported in order.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Print the reports as JSON instead of text.
    #[arg(long)]
    json: bool,
  },
  /// Merge a baseline file with supplementary files; baseline wins on
  /// conflicting codes. Dry run unless --apply is given.
  Merge {
    /// The baseline source file.
    baseline: PathBuf,

    /// Supplementary source files.
    #[arg(required = true)]
    supplements: Vec<PathBuf>,

    /// Write the merged set to the store.
    #[arg(long)]
    apply: bool,

    /// Print the report as JSON instead of text.
    #[arg(long)]
    json: bool,
  },
  /// Compare entity counts against the configured reference standards.
  Validate {
    /// Count a raw source file instead of the persisted store.
    #[arg(long, value_name = "FILE")]
    file: Option<PathBuf>,

    /// Print the findings as JSON instead of text.
    #[arg(long)]
    json: bool,
  },
  /// Classify a single code and print its derived ancestors.
  Inspect {
    /// A geographic code in any source spelling.
    code: String,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let config = settings::load(&cli.config)?;

  match cli.command {
    Commands::Serve => commands::serve::run(config).await,
    Commands::Import { files, json } => {
      commands::import::run(config, files, json).await
    }
    Commands::Merge { baseline, supplements, apply, json } => {
      commands::merge::run(config, baseline, supplements, apply, json).await
    }
    Commands::Validate { file, json } => {
      commands::validate::run(config, file, json).await
    }
    Commands::Inspect { code } => commands::inspect::run(&code),
  }
}
