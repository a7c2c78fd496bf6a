use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

/// Process configuration, layered from a TOML file and `FLORA_*`
/// environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
  /// Path to the SQLite store file.
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
}

fn default_store_path() -> PathBuf {
  PathBuf::from("flora.db")
}

impl PipelineConfig {
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path.to_path_buf()).required(false))
      .add_source(config::Environment::with_prefix("FLORA"))
      .build()
      .context("failed to read config file")?;

    settings
      .try_deserialize()
      .context("failed to deserialise PipelineConfig")
  }
}
