// src/config.rs
//! Runtime configuration: `config/pipeline.toml` plus environment overrides.
//! API keys are resolved from the environment only and never live in the
//! config file.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::neural::DEFAULT_BATCH_SIZE;

pub const ENV_CONFIG_PATH: &str = "PIPELINE_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/pipeline.toml";

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}
fn default_cache_dir() -> PathBuf {
    PathBuf::from("cache/news")
}
fn default_output_path() -> PathBuf {
    PathBuf::from("daily_sentiment_features.csv")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Tickers passed to the news endpoint; trimmed, deduplicated, non-empty.
    pub tickers: Vec<String>,
    /// Optional topic filter (e.g. "earnings", "economy_monetary").
    #[serde(default)]
    pub topics: Vec<String>,
    /// Neural inference batch size; bounds peak memory on the model side.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,
    /// Optional ticker whose close prices are joined into the output table.
    #[serde(default)]
    pub price_ticker: Option<String>,
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// "finbert-api" | "disabled"
    pub provider: String,
    pub model: String,
    /// Full endpoint URL override; defaults to the hosted inference URL for
    /// `model`.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_connect_timeout() -> u64 {
    4
}
fn default_timeout() -> u64 {
    30
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            provider: "finbert-api".to_string(),
            model: "ProsusAI/finbert".to_string(),
            endpoint: None,
            connect_timeout_secs: default_connect_timeout(),
            timeout_secs: default_timeout(),
        }
    }
}

impl PipelineConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let mut cfg: PipelineConfig = toml::from_str(s).context("parsing pipeline config")?;

        cfg.tickers = clean_list(std::mem::take(&mut cfg.tickers));
        if cfg.tickers.is_empty() {
            bail!("pipeline config must list at least one ticker");
        }
        cfg.topics = clean_list(std::mem::take(&mut cfg.topics));

        if cfg.batch_size == 0 {
            tracing::warn!(
                default = DEFAULT_BATCH_SIZE,
                "batch_size = 0 is invalid; using the default"
            );
            cfg.batch_size = DEFAULT_BATCH_SIZE;
        }

        cfg.classifier.provider = cfg.classifier.provider.to_lowercase();
        match cfg.classifier.provider.as_str() {
            "finbert-api" | "disabled" => {}
            other => bail!("unsupported classifier provider: {other}"),
        }

        Ok(cfg)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("reading pipeline config {}", path.as_ref().display()))?;
        Self::from_toml_str(&data)
    }

    /// Load using `$PIPELINE_CONFIG_PATH`, falling back to
    /// `config/pipeline.toml`.
    pub fn load_default() -> Result<Self> {
        let path = std::env::var(ENV_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::load_from_file(path)
    }
}

/// Trim, drop empties, deduplicate while keeping first-seen order.
fn clean_list(items: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::with_capacity(items.len());
    for it in items {
        let t = it.trim();
        if !t.is_empty() && seen.insert(t.to_string()) {
            out.push(t.to_string());
        }
    }
    out
}
