// src/config/mod.rs
//! Application configuration loaded from TOML with env overrides.
//!
//! Lookup order for the file:
//! 1) $TWEET_PULSE_CONFIG
//! 2) config/app.toml
//! 3) built-in defaults

pub mod classifier;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::timeline::TimelineConfig;
use classifier::ClassifierConfig;

pub const DEFAULT_CONFIG_PATH: &str = "config/app.toml";
pub const DEFAULT_CORPUS_PATH: &str = "data/tweets.json";
pub const DEFAULT_MAX_RESULTS: usize = 50;

pub const ENV_CONFIG_PATH: &str = "TWEET_PULSE_CONFIG";
pub const ENV_MAX_RESULTS: &str = "TWEET_PULSE_MAX_RESULTS";
pub const ENV_CORPUS_PATH: &str = "TWEET_PULSE_CORPUS_PATH";

/// Upper bound on evidence items attached to a spike.
const MAX_EVIDENCE_CAP: usize = 10;

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub query: QueryConfig,
    #[serde(default)]
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub timeline: TimelineConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QueryConfig {
    /// Per-request cap on items sent to the classifier.
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CorpusConfig {
    #[serde(default = "default_corpus_path")]
    pub path: PathBuf,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            path: default_corpus_path(),
        }
    }
}

fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}
fn default_corpus_path() -> PathBuf {
    PathBuf::from(DEFAULT_CORPUS_PATH)
}

impl AppConfig {
    /// Parse from an explicit TOML file, then apply env overrides.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        let cfg = Self::from_toml_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        cfg.finish()
    }

    /// Env var path, then `config/app.toml`, then defaults.
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            return Self::load_from(&pb);
        }
        let default = PathBuf::from(DEFAULT_CONFIG_PATH);
        if default.exists() {
            return Self::load_from(&default);
        }
        Self::default().finish()
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    fn finish(mut self) -> Result<Self> {
        if let Some(n) = std::env::var(ENV_MAX_RESULTS)
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok())
        {
            self.query.max_results = n;
        }
        if let Ok(p) = std::env::var(ENV_CORPUS_PATH) {
            self.corpus.path = PathBuf::from(p);
        }
        self.classifier = self.classifier.resolve()?;
        self.sanitize();
        Ok(self)
    }

    /// Clamp values into workable ranges instead of failing start-up.
    pub fn sanitize(&mut self) {
        if self.query.max_results == 0 {
            self.query.max_results = DEFAULT_MAX_RESULTS;
        }
        let defaults = TimelineConfig::default();
        if self.timeline.bucket_minutes == 0 {
            self.timeline.bucket_minutes = defaults.bucket_minutes;
        }
        if !(self.timeline.spike_threshold.is_finite() && self.timeline.spike_threshold > 0.0) {
            self.timeline.spike_threshold = defaults.spike_threshold;
        }
        self.timeline.max_evidence = self.timeline.max_evidence.min(MAX_EVIDENCE_CAP);
        if self.timeline.max_buckets == 0 {
            self.timeline.max_buckets = defaults.max_buckets;
        }
    }
}
