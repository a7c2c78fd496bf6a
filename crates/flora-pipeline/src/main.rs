//! flora pipeline binary.
//!
//! Reads `flora.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store, and runs one pipeline stage per invocation:
//! `load` a batch of readings, `report` critical plants, or `rollup` the
//! reading history into a partitioned archive.

use std::{
  collections::BTreeMap,
  io::{BufRead, Write as _},
  path::{Path, PathBuf},
  time::Duration,
};

use anyhow::Context as _;
use chrono::Utc;
use clap::{Parser, Subcommand};
use flora_analytics::{TtlCache, identify_critical_plants, partition_path, summarise};
use flora_core::{
  PlantStore as _,
  reading::{IncomingReading, LatestReading},
};
use flora_load::{SchemaLoader, UnresolvedPolicy};
use flora_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

mod config;

use config::PipelineConfig;

#[derive(Parser)]
#[command(author, version, about = "Flora plant-monitoring pipeline")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "flora.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Load a batch of denormalised readings into the normalised store.
  Load {
    /// NDJSON file with one incoming reading per line.
    #[arg(long)]
    batch: PathBuf,

    /// Abort on rows with unresolved parent keys instead of dropping them.
    #[arg(long)]
    strict: bool,
  },
  /// Print critical plants (outliers and stale readings) as NDJSON.
  Report {
    /// Re-run the report every N seconds instead of exiting.
    #[arg(long, value_name = "SECONDS")]
    watch: Option<u64>,
  },
  /// Summarise the reading history into a partitioned archive, then purge
  /// the record table.
  Rollup {
    /// Root directory for the partitioned summary layout.
    #[arg(long)]
    out: PathBuf,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let cfg = PipelineConfig::load(&cli.config)?;

  let store_path = expand_tilde(&cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  match cli.command {
    Command::Load { batch, strict } => run_load(store, &batch, strict).await,
    Command::Report { watch } => run_report(store, watch).await,
    Command::Rollup { out } => run_rollup(store, &out).await,
  }
}

async fn run_load(store: SqliteStore, path: &Path, strict: bool) -> anyhow::Result<()> {
  let file = std::fs::File::open(path)
    .with_context(|| format!("failed to open batch file {path:?}"))?;
  let batch = parse_batch(std::io::BufReader::new(file))?;
  if batch.is_empty() {
    anyhow::bail!("batch file {path:?} contains no readings");
  }

  let policy = if strict {
    UnresolvedPolicy::Fail
  } else {
    UnresolvedPolicy::DropAndLog
  };
  let loader = SchemaLoader::with_policy(store, policy);
  let report = loader.load_batch(&batch).await?;

  tracing::info!(
    readings = batch.len(),
    inserted = report.total_inserted(),
    dropped = report.total_dropped(),
    records = report.records.inserted,
    "batch load complete"
  );
  Ok(())
}

/// Parse one [`IncomingReading`] per non-empty line.
fn parse_batch(reader: impl BufRead) -> anyhow::Result<Vec<IncomingReading>> {
  let mut batch = Vec::new();
  for (i, line) in reader.lines().enumerate() {
    let line = line.context("failed to read batch line")?;
    if line.trim().is_empty() {
      continue;
    }
    let reading: IncomingReading = serde_json::from_str(&line)
      .with_context(|| format!("invalid reading on line {}", i + 1))?;
    batch.push(reading);
  }
  Ok(batch)
}

async fn run_report(store: SqliteStore, watch: Option<u64>) -> anyhow::Result<()> {
  let cache = TtlCache::new();

  let Some(interval) = watch else {
    // One-shot: a zero TTL bypasses the cache entirely.
    return print_report(&store, &cache, Duration::ZERO).await;
  };

  // Polling mode: the snapshot stays fresh to within the cache TTL, so
  // tight intervals don't hammer the store.
  let ttl = Duration::from_secs(30);
  loop {
    print_report(&store, &cache, ttl).await?;
    tokio::time::sleep(Duration::from_secs(interval)).await;
  }
}

async fn print_report(
  store: &SqliteStore,
  cache: &TtlCache<Vec<LatestReading>>,
  ttl: Duration,
) -> anyhow::Result<()> {
  let snapshot = match cache.get(ttl) {
    Some(snapshot) => snapshot,
    None => {
      let snapshot = store.latest_readings().await?;
      cache.put(snapshot.clone());
      snapshot
    }
  };

  let critical = identify_critical_plants(&snapshot, Utc::now());
  tracing::info!(
    plants = snapshot.len(),
    critical = critical.len(),
    "report computed"
  );

  let mut stdout = std::io::stdout().lock();
  for plant in &critical {
    serde_json::to_writer(&mut stdout, plant)?;
    stdout.write_all(b"\n")?;
  }
  Ok(())
}

async fn run_rollup(store: SqliteStore, out: &Path) -> anyhow::Result<()> {
  let history = store.reading_history().await?;
  if history.is_empty() {
    tracing::info!("no reading history to archive");
    return Ok(());
  }

  let summaries = summarise(&history);

  let mut partitions: BTreeMap<String, Vec<&flora_analytics::Summary>> = BTreeMap::new();
  for summary in &summaries {
    partitions.entry(partition_path(summary)).or_default().push(summary);
  }

  for (partition, rows) in &partitions {
    let dir = out.join(partition);
    std::fs::create_dir_all(&dir)
      .with_context(|| format!("failed to create partition directory {dir:?}"))?;
    let file_path = dir.join("summary.ndjson");
    let file = std::fs::File::create(&file_path)
      .with_context(|| format!("failed to create {file_path:?}"))?;
    let mut writer = std::io::BufWriter::new(file);
    for row in rows {
      serde_json::to_writer(&mut writer, row)?;
      writer.write_all(b"\n")?;
    }
    writer
      .flush()
      .with_context(|| format!("failed to write {file_path:?}"))?;
  }

  tracing::info!(
    readings = history.len(),
    groups = summaries.len(),
    partitions = partitions.len(),
    "archive written"
  );

  // Purge only once every partition has landed on disk.
  let purged = store.purge_records().await?;
  tracing::info!(purged, "record table purged");
  Ok(())
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
  use super::parse_batch;

  const LINE: &str = r#"{"plant_id":1,"name":"Fern","origin_city":"Seattle","origin_country":"USA","temperature":22.5,"last_watered":"2025-06-04T08:00:00Z","soil_moisture":35.0,"recording_taken":"2025-06-04T14:00:00Z","botanist_name":"Alice","botanist_email":"alice@lnhm.co.uk","botanist_phone":"+441234567890"}"#;

  #[test]
  fn blank_lines_are_skipped() {
    let input = format!("{LINE}\n\n{LINE}\n");
    let batch = parse_batch(input.as_bytes()).unwrap();
    assert_eq!(batch.len(), 2);
    assert_eq!(batch[0].name, "Fern");
  }

  #[test]
  fn malformed_line_reports_its_number() {
    let input = format!("{LINE}\nnot json\n");
    let err = parse_batch(input.as_bytes()).unwrap_err();
    assert!(err.to_string().contains("line 2"));
  }
}
