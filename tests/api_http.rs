// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health
// - GET /analyze (full pipeline, empty corpus, no match, classifier outage, cap)
// - GET /debug/lexicon

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use serde_json::Value as Json;
use shuttle_axum::axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use tower::ServiceExt as _; // for `oneshot`

use tweet_pulse::adapter::{DynClassifier, FailingClassifier, MockClassifier};
use tweet_pulse::api::{self, AnalyzeResponse, AppState, MSG_NO_DATASET, MSG_NO_MATCH};
use tweet_pulse::config::AppConfig;
use tweet_pulse::corpus::InMemoryCorpus;
use tweet_pulse::{Item, SentimentLabel};

const BODY_LIMIT: usize = 1024 * 1024;

fn corpus() -> Vec<Item> {
    let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
    let at = |m: i64| t0 + Duration::minutes(m);
    vec![
        Item::new("Steam sale is amazing", at(0), 20, 5),
        Item::new("Steam deck arrived, happy", at(5), 3, 0),
        Item::new("Totally unrelated post", at(7), 0, 0),
        Item::new("Steam servers down, worst night", at(10), 1, 0),
        Item::new("Steam refund denied, awful and useless", at(16), 40, 12),
        Item::new("Steam keeps crashing, I hate it", at(20), 8, 2),
    ]
}

fn mock() -> MockClassifier {
    MockClassifier::default()
        .with("Steam sale is amazing", SentimentLabel::Positive, 0.9)
        .with("Steam deck arrived, happy", SentimentLabel::Positive, 0.8)
        .with("Steam servers down, worst night", SentimentLabel::Positive, 0.7)
        .with("Steam refund denied, awful and useless", SentimentLabel::Negative, -0.95)
        .with("Steam keeps crashing, I hate it", SentimentLabel::Negative, -0.85)
}

fn app_with(classifier: DynClassifier, items: Vec<Item>, config: AppConfig) -> Router {
    let state = AppState::new(classifier, Arc::new(InMemoryCorpus::new(items)), config);
    api::router(state)
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Json) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build request");
    let resp = app.oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    let v: Json = serde_json::from_slice(&bytes).expect("parse json");
    (status, v)
}

#[tokio::test]
async fn api_health_returns_200_and_ok_body() {
    let app = app_with(Arc::new(mock()), corpus(), AppConfig::default());

    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .expect("build GET /health");
    let resp = app.oneshot(req).await.expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    assert_eq!(String::from_utf8(bytes).expect("utf8").trim(), "ok");
}

#[tokio::test]
async fn api_analyze_returns_records_timeline_and_spike() {
    let app = app_with(Arc::new(mock()), corpus(), AppConfig::default());
    let (status, v) = get_json(app, "/analyze?query=STEAM").await;
    assert_eq!(status, StatusCode::OK);

    let resp: AnalyzeResponse = serde_json::from_value(v.clone()).expect("response shape");
    assert_eq!(resp.query, "STEAM");
    assert_eq!(resp.total_analyzed, 5);
    assert_eq!(resp.tweets.len(), 5);
    assert!(resp.message.is_none());
    assert!(v.get("message").is_none(), "message omitted on success");

    // "worst" alone doesn't trip the intent rule, but anger vs +0.7 is a mixed signal
    let servers = &resp.tweets[2];
    assert_eq!(servers.tweet, "Steam servers down, worst night");
    assert_eq!(servers.emotion, "anger");
    assert_eq!(servers.confidence, "low");
    assert_eq!(servers.sentiment, "Positive");
    assert_eq!(servers.timestamp, "2024-05-01 10:10");

    let refund = &resp.tweets[3];
    assert_eq!(refund.sentiment_score, -0.95);
    assert_eq!(refund.confidence, "high");
    assert!(refund.impact > 0.95);

    assert_eq!(resp.timeline.len(), 2);
    assert_eq!(resp.timeline[0].timestamp, "2024-05-01 10:00");
    assert_eq!(resp.timeline[0].count, 3);
    assert_eq!(resp.timeline[0].sentiment_score, 0.8);
    assert_eq!(resp.timeline[1].count, 2);
    assert_eq!(resp.timeline[1].sentiment_score, -0.9);

    assert_eq!(resp.spikes.len(), 1);
    assert_eq!(resp.spikes[0].time, "2024-05-01 10:15");
    assert_eq!(resp.spikes[0].drop, 1.7);
    assert_eq!(
        resp.spikes[0].tweets,
        vec![
            "Steam refund denied, awful and useless".to_string(),
            "Steam keeps crashing, I hate it".to_string(),
        ]
    );
}

#[tokio::test]
async fn api_analyze_empty_corpus_reports_message() {
    let app = app_with(Arc::new(mock()), Vec::new(), AppConfig::default());
    let (status, v) = get_json(app, "/analyze?query=steam").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["tweets"].as_array().map(Vec::len), Some(0));
    assert_eq!(v["timeline"].as_array().map(Vec::len), Some(0));
    assert_eq!(v["message"], MSG_NO_DATASET);
}

#[tokio::test]
async fn api_analyze_no_match_reports_message() {
    let app = app_with(Arc::new(mock()), corpus(), AppConfig::default());
    let (status, v) = get_json(app, "/analyze?query=nintendo").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["tweets"].as_array().map(Vec::len), Some(0));
    assert_eq!(v["timeline"].as_array().map(Vec::len), Some(0));
    assert_eq!(v["message"], MSG_NO_MATCH);
    assert_eq!(v["total_analyzed"], 0);
}

#[tokio::test]
async fn api_analyze_classifier_outage_is_503_with_empty_shape() {
    let app = app_with(Arc::new(FailingClassifier), corpus(), AppConfig::default());
    let (status, v) = get_json(app, "/analyze?query=steam").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(v["tweets"].as_array().map(Vec::len), Some(0));
    assert_eq!(v["timeline"].as_array().map(Vec::len), Some(0));
    assert_eq!(v["spikes"].as_array().map(Vec::len), Some(0));
    let msg = v["message"].as_str().unwrap_or_default();
    assert!(msg.starts_with("analysis unavailable"), "message: {msg}");
}

#[tokio::test]
async fn api_analyze_respects_configured_cap() {
    let mut config = AppConfig::default();
    config.query.max_results = 2;
    let app = app_with(Arc::new(mock()), corpus(), config);
    let (_, v) = get_json(app, "/analyze?query=steam").await;
    let resp: AnalyzeResponse = serde_json::from_value(v).expect("response shape");
    assert_eq!(resp.total_analyzed, 2);
    assert_eq!(resp.tweets[0].tweet, "Steam sale is amazing");
    assert_eq!(resp.tweets[1].tweet, "Steam deck arrived, happy");
}

#[tokio::test]
async fn api_debug_lexicon_inspects_text() {
    let app = app_with(Arc::new(mock()), corpus(), AppConfig::default());
    let (status, v) = get_json(
        app,
        "/debug/lexicon?text=worst%20awful%20terrible%20experience&score=0.5",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["emotion"], "anger");
    assert_eq!(v["negative_hits"], 3);
    assert_eq!(v["intent_confidence"], "low");
    let adjusted = v["adjusted_score"].as_f64().expect("number");
    assert!((adjusted + 0.1).abs() < 1e-9);
}
