//! `pitchside`: load tactical match data into a SQLite store.
//!
//! # Usage
//!
//! ```
//! pitchside init
//! pitchside stage-players data/players.csv
//! pitchside stage-competitions data/competitions.csv
//! pitchside normalize
//! pitchside load-metadata data/metadata
//! pitchside load-rosters data/rosters
//! pitchside load-events data/event_data
//! pitchside load-tracking data/tracking_data/*.jsonl.bz2 --min-frame-gap-ms 100
//! pitchside counts
//! ```
//!
//! Settings come from `pitchside.toml` (or `--config`), overridden by
//! `PITCHSIDE_`-prefixed environment variables, e.g. `PITCHSIDE_STORE_PATH` or
//! `PITCHSIDE_TRACKING__BALL_SOURCE`.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use pitchside_core::{report::LoadReport, store::MatchStore};
use pitchside_ingest::{BallSource, IngestConfig, Pipeline, TrackingConfig};
use pitchside_store_sqlite::SqliteStore;
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(author, version, about = "Pitchside match data loader")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "pitchside.toml")]
  config: PathBuf,

  /// SQLite database file; overrides `store_path` from config.
  #[arg(long, value_name = "FILE")]
  store: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Create the database and schema if missing.
  Init,
  /// Append a players CSV to staging.
  StagePlayers { csv: PathBuf },
  /// Append a competitions CSV to staging.
  StageCompetitions { csv: PathBuf },
  /// Deduplicate staging into players, competitions and competition games.
  Normalize,
  /// Empty the staging tables.
  ClearStaging,
  /// Load every match metadata JSON file in a directory.
  LoadMetadata { dir: PathBuf },
  /// Load every roster JSON file in a directory.
  LoadRosters { dir: PathBuf },
  /// Load every event JSON file in a directory.
  LoadEvents { dir: PathBuf },
  /// Load tracking JSONL files (optionally .bz2).
  LoadTracking {
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Keep frames at least this many ms of video time apart.
    #[arg(long)]
    min_frame_gap_ms: Option<f64>,

    /// Which ball array to load: smoothed or raw.
    #[arg(long)]
    ball_source: Option<BallSource>,

    /// Frames per store transaction.
    #[arg(long)]
    frames_per_batch: Option<usize>,
  },
  /// Print row counts for every core table.
  Counts,
}

// ─── Config file ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct Settings {
  #[serde(default = "default_store_path")]
  store_path: PathBuf,
  #[serde(default)]
  tracking:   TrackingConfig,
}

fn default_store_path() -> PathBuf { PathBuf::from("pitchside.db") }

// ─── Entry point ─────────────────────────────────────────────────────────────

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

  let settings: Settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(
      config::Environment::with_prefix("PITCHSIDE")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true),
    )
    .build()
    .context("failed to read config file")?
    .try_deserialize()
    .context("failed to deserialise settings")?;

  let store_path = expand_tilde(cli.store.as_deref().unwrap_or(&settings.store_path));
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let mut ingest = IngestConfig { tracking: settings.tracking };
  if let Command::LoadTracking { min_frame_gap_ms, ball_source, frames_per_batch, .. } =
    &cli.command
  {
    let t = &mut ingest.tracking;
    t.min_frame_gap_ms = min_frame_gap_ms.unwrap_or(t.min_frame_gap_ms);
    t.ball_source = ball_source.unwrap_or(t.ball_source);
    t.frames_per_batch = frames_per_batch.unwrap_or(t.frames_per_batch);
  }

  let pipeline = Pipeline::new(store, ingest);
  run(&pipeline, cli.command, &store_path).await
}

async fn run(
  pipeline: &Pipeline<SqliteStore>,
  command: Command,
  store_path: &Path,
) -> anyhow::Result<()> {
  let report = match command {
    Command::Init => {
      tracing::info!(path = %store_path.display(), "store ready");
      return Ok(());
    }
    Command::StagePlayers { csv } => pipeline
      .stage_players_csv(&csv)
      .await
      .with_context(|| format!("staging {}", csv.display()))?,
    Command::StageCompetitions { csv } => pipeline
      .stage_competitions_csv(&csv)
      .await
      .with_context(|| format!("staging {}", csv.display()))?,
    Command::Normalize => pipeline.normalize().await.context("normalizing staging")?,
    Command::ClearStaging => {
      pipeline.clear_staging().await.context("clearing staging")?;
      return Ok(());
    }
    Command::LoadMetadata { dir } => pipeline
      .load_metadata_dir(&dir)
      .await
      .with_context(|| format!("loading metadata from {}", dir.display()))?,
    Command::LoadRosters { dir } => pipeline
      .load_rosters_dir(&dir)
      .await
      .with_context(|| format!("loading rosters from {}", dir.display()))?,
    Command::LoadEvents { dir } => pipeline
      .load_events_dir(&dir)
      .await
      .with_context(|| format!("loading events from {}", dir.display()))?,
    Command::LoadTracking { files, .. } => pipeline
      .load_tracking_files(&files)
      .await
      .context("loading tracking files")?,
    Command::Counts => {
      let counts = pipeline.store().row_counts().await.context("counting rows")?;
      for (table, n) in counts {
        println!("{table:<36} {n:>10}");
      }
      return Ok(());
    }
  };

  print_report(&report);
  Ok(())
}

fn print_report(report: &LoadReport) {
  println!("run {} ({})", report.run_id, report.source);
  for (table, n) in &report.rows {
    println!("  {table:<36} {n:>10}");
  }
  if report.skipped > 0 {
    println!("  skipped records: {}", report.skipped);
  }
  for issue in &report.issues {
    println!("  issue: {issue}");
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn tracking_flags_parse() {
    let cli = Cli::parse_from([
      "pitchside",
      "load-tracking",
      "a.jsonl.bz2",
      "b.jsonl.bz2",
      "--ball-source",
      "raw",
      "--min-frame-gap-ms",
      "40",
    ]);
    let Command::LoadTracking { files, min_frame_gap_ms, ball_source, frames_per_batch } =
      cli.command
    else {
      panic!("wrong subcommand");
    };
    assert_eq!(files.len(), 2);
    assert_eq!(min_frame_gap_ms, Some(40.0));
    assert_eq!(ball_source, Some(BallSource::Raw));
    assert_eq!(frames_per_batch, None);
  }

  #[test]
  fn tilde_expands_only_at_start() {
    if let Ok(home) = std::env::var("HOME") {
      assert_eq!(expand_tilde(Path::new("~/x.db")), PathBuf::from(home).join("x.db"));
    }
    assert_eq!(expand_tilde(Path::new("a/~/x.db")), PathBuf::from("a/~/x.db"));
  }
}
