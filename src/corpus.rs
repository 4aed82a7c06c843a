//! Corpus providers and the load-once corpus cache.
//!
//! The corpus is read-only after its first load. `CorpusCache` runs the
//! provider exactly once even under concurrent first access; a failed load is
//! cached as an empty corpus.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::OnceCell;
use tracing::{error, info, warn};

use crate::model::Item;

/// Longest text kept per item (chars).
const MAX_TEXT_CHARS: usize = 1500;

#[async_trait::async_trait]
pub trait CorpusProvider: Send + Sync {
    async fn get_items(&self) -> Result<Vec<Item>>;
    fn name(&self) -> &'static str;
}

/// JSON array of `{text|tweet, timestamp, likes?, retweets?}` objects.
#[derive(Debug, Clone)]
pub struct JsonFileCorpus {
    path: PathBuf,
}

impl JsonFileCorpus {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl CorpusProvider for JsonFileCorpus {
    async fn get_items(&self) -> Result<Vec<Item>> {
        let exists = tokio::fs::try_exists(&self.path)
            .await
            .with_context(|| format!("checking corpus at {}", self.path.display()))?;
        if !exists {
            warn!(path = %self.path.display(), "corpus file not found; serving empty corpus");
            return Ok(Vec::new());
        }
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("reading corpus from {}", self.path.display()))?;
        parse_corpus(&raw).with_context(|| format!("parsing corpus {}", self.path.display()))
    }

    fn name(&self) -> &'static str {
        "json_file"
    }
}

/// Fixed items, mainly for tests and demos.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCorpus {
    items: Vec<Item>,
}

impl InMemoryCorpus {
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }
}

#[async_trait::async_trait]
impl CorpusProvider for InMemoryCorpus {
    async fn get_items(&self) -> Result<Vec<Item>> {
        Ok(clean_items(self.items.clone()))
    }

    fn name(&self) -> &'static str {
        "in_memory"
    }
}

pub fn parse_corpus(raw: &str) -> Result<Vec<Item>> {
    let items: Vec<Item> = serde_json::from_str(raw)?;
    Ok(clean_items(items))
}

/// Normalize texts and drop items left empty.
fn clean_items(items: Vec<Item>) -> Vec<Item> {
    items
        .into_iter()
        .filter_map(|mut it| {
            it.text = normalize_text(&it.text);
            (!it.text.is_empty()).then_some(it)
        })
        .collect()
}

/// Decode HTML entities, collapse whitespace, cap length.
pub fn normalize_text(s: &str) -> String {
    let decoded = html_escape::decode_html_entities(s);
    let collapsed = decoded.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() > MAX_TEXT_CHARS {
        collapsed.chars().take(MAX_TEXT_CHARS).collect()
    } else {
        collapsed
    }
}

/// Lazily loaded, shared, read-only corpus.
pub struct CorpusCache {
    provider: Arc<dyn CorpusProvider>,
    cell: OnceCell<Arc<Vec<Item>>>,
}

impl CorpusCache {
    pub fn new(provider: Arc<dyn CorpusProvider>) -> Self {
        Self {
            provider,
            cell: OnceCell::new(),
        }
    }

    /// Load on first call; every later call returns the same snapshot.
    pub async fn items(&self) -> Arc<Vec<Item>> {
        self.cell
            .get_or_init(|| async {
                match self.provider.get_items().await {
                    Ok(items) => {
                        info!(provider = self.provider.name(), n = items.len(), "corpus loaded");
                        Arc::new(items)
                    }
                    Err(e) => {
                        error!(provider = self.provider.name(), "corpus load failed: {e:#}");
                        Arc::new(Vec::new())
                    }
                }
            })
            .await
            .clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.initialized()
    }
}
