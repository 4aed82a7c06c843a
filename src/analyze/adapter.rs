//! Sentiment adapter: classifier abstraction + concrete providers.
//!
//! The classifier is a black box mapping a batch of texts to `(label, signed
//! score)` pairs, same length and order as the input. It is the only failure
//! point of a request and is always called once per batch.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::classifier::ClassifierConfig;
use crate::error::AnalysisError;
use crate::model::SentimentLabel;
use crate::sentiment::SentimentAnalyzer;

// ------------------------------------------------------------
// Public surface
// ------------------------------------------------------------

/// One classifier verdict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    pub label: SentimentLabel,
    /// Signed score in [-1, 1].
    pub score: f64,
}

impl Sentiment {
    pub fn new(label: SentimentLabel, score: f64) -> Self {
        Self { label, score }
    }
}

#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    /// Classify every text. Output has the input's length and order; an empty
    /// batch yields an empty result. Any failure fails the whole batch.
    async fn classify_batch(&self, texts: &[String]) -> Result<Vec<Sentiment>, AnalysisError>;

    /// Provider name for diagnostics.
    fn provider_name(&self) -> &'static str;
}

pub type DynClassifier = Arc<dyn SentimentClassifier>;

/// Factory: build a classifier according to (already resolved) config.
pub fn build_classifier_from_config(config: &ClassifierConfig) -> anyhow::Result<DynClassifier> {
    match config.provider.as_str() {
        "http" => Ok(Arc::new(HttpClassifier::new(config)?)),
        "mock" => Ok(Arc::new(MockClassifier::default())),
        _ => Ok(Arc::new(LexiconClassifier::new())),
    }
}

// ------------------------------------------------------------
// Local lexicon provider
// ------------------------------------------------------------

/// Deterministic, in-process classifier backed by the word lexicon.
#[derive(Debug, Clone, Default)]
pub struct LexiconClassifier {
    analyzer: SentimentAnalyzer,
}

impl LexiconClassifier {
    pub fn new() -> Self {
        Self {
            analyzer: SentimentAnalyzer::new(),
        }
    }
}

#[async_trait]
impl SentimentClassifier for LexiconClassifier {
    async fn classify_batch(&self, texts: &[String]) -> Result<Vec<Sentiment>, AnalysisError> {
        Ok(texts
            .iter()
            .map(|t| {
                let (label, score) = self.analyzer.classify(t);
                Sentiment::new(label, score)
            })
            .collect())
    }

    fn provider_name(&self) -> &'static str {
        "lexicon"
    }
}

// ------------------------------------------------------------
// Remote text-classification provider
// ------------------------------------------------------------

/// Hugging Face inference-style endpoint: POST `{"inputs": [...]}` returns,
/// per text, a list of `{label, score}` class probabilities.
pub struct HttpClassifier {
    http: reqwest::Client,
    url: String,
    token: String,
}

#[derive(Serialize)]
struct ClassifyReq<'a> {
    inputs: &'a [String],
}

#[derive(Debug, Deserialize)]
struct ClassProb {
    label: String,
    score: f64,
}

impl HttpClassifier {
    pub fn new(config: &ClassifierConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("tweet-pulse/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            url: config.api_url.clone(),
            token: config.api_token.clone(),
        })
    }
}

#[async_trait]
impl SentimentClassifier for HttpClassifier {
    async fn classify_batch(&self, texts: &[String]) -> Result<Vec<Sentiment>, AnalysisError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut req = self.http.post(&self.url).json(&ClassifyReq { inputs: texts });
        if !self.token.is_empty() {
            req = req.bearer_auth(&self.token);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| AnalysisError::AdapterFailure(format!("request failed: {e}")))?;
        let status = resp.status();
        if !status.is_success() {
            warn!(target: "adapter", %status, "classifier endpoint returned an error status");
            return Err(AnalysisError::AdapterFailure(format!(
                "classifier returned status {status}"
            )));
        }

        let body: Vec<Vec<ClassProb>> = resp
            .json()
            .await
            .map_err(|e| AnalysisError::AdapterFailure(format!("unreadable response: {e}")))?;

        if body.len() != texts.len() {
            return Err(AnalysisError::AdapterFailure(format!(
                "classifier returned {} results for {} texts",
                body.len(),
                texts.len()
            )));
        }

        body.iter().map(|probs| top_class(probs)).collect()
    }

    fn provider_name(&self) -> &'static str {
        "http"
    }
}

/// Pick the most probable class and sign its probability by polarity.
fn top_class(probs: &[ClassProb]) -> Result<Sentiment, AnalysisError> {
    let best = probs
        .iter()
        .max_by(|a, b| a.score.total_cmp(&b.score))
        .ok_or_else(|| AnalysisError::AdapterFailure("empty class distribution".into()))?;
    let label = SentimentLabel::parse(&best.label).ok_or_else(|| {
        AnalysisError::AdapterFailure(format!("unknown sentiment label '{}'", best.label))
    })?;
    debug!(target: "adapter", label = ?label, p = best.score, "top class");
    Ok(Sentiment::new(label, label.signed(best.score)))
}

// ------------------------------------------------------------
// Test doubles
// ------------------------------------------------------------

/// Deterministic mock: fixed verdicts per exact text, fallback for the rest.
#[derive(Debug, Clone)]
pub struct MockClassifier {
    pub fixed: HashMap<String, Sentiment>,
    pub fallback: Sentiment,
}

impl Default for MockClassifier {
    fn default() -> Self {
        Self {
            fixed: HashMap::new(),
            fallback: Sentiment::new(SentimentLabel::Neutral, 0.0),
        }
    }
}

impl MockClassifier {
    pub fn with(mut self, text: impl Into<String>, label: SentimentLabel, score: f64) -> Self {
        self.fixed.insert(text.into(), Sentiment::new(label, score));
        self
    }
}

#[async_trait]
impl SentimentClassifier for MockClassifier {
    async fn classify_batch(&self, texts: &[String]) -> Result<Vec<Sentiment>, AnalysisError> {
        Ok(texts
            .iter()
            .map(|t| self.fixed.get(t).copied().unwrap_or(self.fallback))
            .collect())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Always fails the batch.
#[derive(Debug, Clone, Default)]
pub struct FailingClassifier;

#[async_trait]
impl SentimentClassifier for FailingClassifier {
    async fn classify_batch(&self, _texts: &[String]) -> Result<Vec<Sentiment>, AnalysisError> {
        Err(AnalysisError::AdapterFailure("classifier offline".into()))
    }

    fn provider_name(&self) -> &'static str {
        "failing"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lexicon_keeps_length_and_order() {
        let c = LexiconClassifier::new();
        let texts = vec![
            "I love it".to_string(),
            "plain words".to_string(),
            "awful and broken".to_string(),
        ];
        let out = c.classify_batch(&texts).await.unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].label, SentimentLabel::Positive);
        assert_eq!(out[1].label, SentimentLabel::Neutral);
        assert_eq!(out[2].label, SentimentLabel::Negative);
        assert!(c.classify_batch(&[]).await.unwrap().is_empty());
    }

    #[test]
    fn top_class_signs_probability() {
        let probs = vec![
            ClassProb { label: "LABEL_0".into(), score: 0.82 },
            ClassProb { label: "LABEL_1".into(), score: 0.15 },
            ClassProb { label: "LABEL_2".into(), score: 0.03 },
        ];
        let s = top_class(&probs).unwrap();
        assert_eq!(s.label, SentimentLabel::Negative);
        assert!((s.score + 0.82).abs() < 1e-12);

        let neutral = vec![ClassProb { label: "neutral".into(), score: 0.9 }];
        assert_eq!(top_class(&neutral).unwrap().score, 0.0);
    }

    #[test]
    fn top_class_rejects_garbage() {
        assert!(top_class(&[]).is_err());
        let odd = vec![ClassProb { label: "sarcastic".into(), score: 0.9 }];
        assert!(matches!(top_class(&odd), Err(AnalysisError::AdapterFailure(_))));
    }

    #[tokio::test]
    async fn failing_classifier_fails_whole_batch() {
        let err = FailingClassifier
            .classify_batch(&["x".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::AdapterFailure(_)));
    }

    #[test]
    fn factory_picks_provider() {
        let cfg = ClassifierConfig {
            provider: "mock".into(),
            ..Default::default()
        };
        assert_eq!(build_classifier_from_config(&cfg).unwrap().provider_name(), "mock");
        let cfg = ClassifierConfig::default();
        assert_eq!(build_classifier_from_config(&cfg).unwrap().provider_name(), "lexicon");
    }
}
