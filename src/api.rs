use std::sync::Arc;

use metrics::counter;
use serde::{Deserialize, Serialize};
use shuttle_axum::axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::analyze::{self, adapter::DynClassifier};
use crate::config::AppConfig;
use crate::corpus::{CorpusCache, CorpusProvider, JsonFileCorpus};
use crate::error::AnalysisError;
use crate::model::{round_to, ScoredItem, Spike, TimeBucket, DISPLAY_TS_FORMAT};
use crate::query::filter_items;
use crate::timeline::build_timeline;

pub const MSG_NO_DATASET: &str = "Dataset not loaded";
pub const MSG_NO_MATCH: &str = "No tweets found";

#[derive(Clone)]
pub struct AppState {
    pub classifier: DynClassifier,
    pub corpus: Arc<CorpusCache>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(
        classifier: DynClassifier,
        corpus: Arc<dyn CorpusProvider>,
        config: AppConfig,
    ) -> Self {
        Self {
            classifier,
            corpus: Arc::new(CorpusCache::new(corpus)),
            config: Arc::new(config),
        }
    }

    /// Wire classifier and JSON corpus from a resolved config.
    pub fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let classifier = analyze::adapter::build_classifier_from_config(&config.classifier)?;
        let corpus = Arc::new(JsonFileCorpus::new(config.corpus.path.clone()));
        Ok(Self::new(classifier, corpus, config))
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(|| async { "ok" }))
        .route("/analyze", get(analyze_handler))
        .with_state(state)
        .merge(analyze::debug::router())
        .layer(CorsLayer::very_permissive())
}

/// Same router under the shorter name used by tests and the binary.
pub fn router(state: AppState) -> Router {
    create_router(state)
}

#[derive(Serialize)]
struct RootOut {
    status: &'static str,
}

async fn root() -> Json<RootOut> {
    Json(RootOut {
        status: "Backend running",
    })
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeParams {
    #[serde(default)]
    pub query: String,
}

/// Dashboard-facing record of one scored tweet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TweetRecord {
    pub tweet: String,
    pub sentiment: String,
    pub sentiment_score: f64,
    pub emotion: String,
    pub toxic: bool,
    pub impact: f64,
    pub likes: u64,
    pub retweets: u64,
    pub timestamp: String,
    pub confidence: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelinePoint {
    pub timestamp: String,
    pub sentiment_score: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpikeRecord {
    pub time: String,
    pub drop: f64,
    pub tweets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub query: String,
    pub total_analyzed: usize,
    pub tweets: Vec<TweetRecord>,
    pub timeline: Vec<TimelinePoint>,
    pub spikes: Vec<SpikeRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AnalyzeResponse {
    fn empty(query: &str, message: impl Into<String>) -> Self {
        Self {
            query: query.to_string(),
            total_analyzed: 0,
            tweets: Vec::new(),
            timeline: Vec::new(),
            spikes: Vec::new(),
            message: Some(message.into()),
        }
    }
}

impl From<&ScoredItem> for TweetRecord {
    fn from(s: &ScoredItem) -> Self {
        Self {
            tweet: s.item.text.clone(),
            sentiment: enum_str(&s.sentiment_label),
            sentiment_score: s.sentiment_score,
            emotion: enum_str(&s.emotion),
            toxic: s.toxic,
            impact: s.impact,
            likes: s.item.likes,
            retweets: s.item.retweets,
            timestamp: s.item.timestamp.format(DISPLAY_TS_FORMAT).to_string(),
            confidence: enum_str(&s.confidence),
        }
    }
}

impl From<&TimeBucket> for TimelinePoint {
    fn from(b: &TimeBucket) -> Self {
        Self {
            timestamp: b.start.format(DISPLAY_TS_FORMAT).to_string(),
            sentiment_score: round_to(b.mean, 3),
            count: b.count,
        }
    }
}

impl From<&Spike> for SpikeRecord {
    fn from(s: &Spike) -> Self {
        Self {
            time: s.at.format(DISPLAY_TS_FORMAT).to_string(),
            drop: s.drop,
            tweets: s.evidence.iter().map(|e| e.item.text.clone()).collect(),
        }
    }
}

/// Serde name of a unit enum variant ("anger", "low", ...).
fn enum_str<T: Serialize>(v: &T) -> String {
    serde_json::to_value(v)
        .ok()
        .and_then(|j| j.as_str().map(str::to_string))
        .unwrap_or_default()
}

/// Filter, classify, synthesize and aggregate for one query.
pub async fn analyze_query(state: &AppState, query: &str) -> (StatusCode, AnalyzeResponse) {
    counter!("analyze_requests_total").increment(1);

    let corpus = state.corpus.items().await;
    if corpus.is_empty() {
        return (StatusCode::OK, AnalyzeResponse::empty(query, MSG_NO_DATASET));
    }

    let selected = filter_items(&corpus, query, state.config.query.max_results);
    if selected.is_empty() {
        return (StatusCode::OK, AnalyzeResponse::empty(query, MSG_NO_MATCH));
    }

    let scored = match analyze::synthesize(&selected, state.classifier.as_ref()).await {
        Ok(s) => s,
        Err(e @ AnalysisError::AdapterFailure(_)) => {
            counter!("analyze_adapter_failures_total").increment(1);
            warn!(provider = state.classifier.provider_name(), "analysis unavailable: {e}");
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                AnalyzeResponse::empty(query, format!("analysis unavailable: {e}")),
            );
        }
        Err(e) => {
            warn!("analysis failed: {e}");
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                AnalyzeResponse::empty(query, format!("analysis unavailable: {e}")),
            );
        }
    };

    let timeline = build_timeline(&scored, &state.config.timeline);
    counter!("analyze_spikes_total").increment(timeline.spikes.len() as u64);
    info!(
        selected = selected.len(),
        scored = scored.len(),
        buckets = timeline.buckets.len(),
        spikes = timeline.spikes.len(),
        "analyze done"
    );

    let message = scored
        .is_empty()
        .then(|| "No tweets could be analyzed".to_string());
    let resp = AnalyzeResponse {
        query: query.to_string(),
        total_analyzed: scored.len(),
        tweets: scored.iter().map(TweetRecord::from).collect(),
        timeline: timeline.buckets.iter().map(TimelinePoint::from).collect(),
        spikes: timeline.spikes.iter().map(SpikeRecord::from).collect(),
        message,
    };
    (StatusCode::OK, resp)
}

async fn analyze_handler(
    State(state): State<AppState>,
    Query(params): Query<AnalyzeParams>,
) -> (StatusCode, Json<AnalyzeResponse>) {
    let (status, resp) = analyze_query(&state, &params.query).await;
    (status, Json(resp))
}
