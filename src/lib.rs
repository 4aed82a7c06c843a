// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod analyze;
pub mod api;
pub mod config;
pub mod corpus;
pub mod error;
pub mod model;
pub mod query;
pub mod sentiment;
pub mod telemetry;
pub mod timeline;

// ---- Re-exports for stable public API ----
pub use analyze::adapter;
pub use crate::api::{router, AppState};
pub use crate::error::AnalysisError;
pub use crate::model::{
    Confidence, Emotion, Item, ScoredItem, SentimentLabel, Spike, TimeBucket, Timeline,
};
