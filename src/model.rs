//! Core records flowing through the pipeline: raw corpus items, scored items,
//! timeline buckets and detected spikes.
//!
//! Everything here is plain data. Scored records are built once by the
//! synthesizer and never mutated afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Timestamp format the dashboard expects.
pub const DISPLAY_TS_FORMAT: &str = "%Y-%m-%d %H:%M";

/// One tweet as it sits in the corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    #[serde(alias = "tweet")]
    pub text: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub retweets: u64,
}

impl Item {
    pub fn new(text: impl Into<String>, timestamp: DateTime<Utc>, likes: u64, retweets: u64) -> Self {
        Self {
            text: text.into(),
            timestamp,
            likes,
            retweets,
        }
    }
}

/// Polarity label reported by the sentiment adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum SentimentLabel {
    Negative,
    Neutral,
    Positive,
}

impl SentimentLabel {
    /// Lenient parse for labels coming back from remote classifiers
    /// ("NEGATIVE", "LABEL_0", "neg", ...).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "negative" | "neg" | "label_0" => Some(Self::Negative),
            "neutral" | "neu" | "label_1" => Some(Self::Neutral),
            "positive" | "pos" | "label_2" => Some(Self::Positive),
            _ => None,
        }
    }

    /// Signed score for a class probability, following the label's polarity.
    pub fn signed(self, probability: f64) -> f64 {
        match self {
            Self::Positive => probability,
            Self::Negative => -probability,
            Self::Neutral => 0.0,
        }
    }
}

/// Keyword-derived emotion category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Anger,
    Joy,
    Sadness,
    Fear,
    Neutral,
}

impl Emotion {
    pub fn is_negative(self) -> bool {
        matches!(self, Self::Anger | Self::Sadness | Self::Fear)
    }
}

/// Whether cross-signal checks cast doubt on the sentiment score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Low,
}

impl Confidence {
    /// Low wins: either signal flagging doubt makes the result low.
    pub fn or(self, other: Confidence) -> Confidence {
        if self == Self::Low || other == Self::Low {
            Self::Low
        } else {
            Self::High
        }
    }
}

/// A corpus item joined with every per-item signal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredItem {
    pub item: Item,
    pub sentiment_label: SentimentLabel,
    /// Always within [-1, 1].
    pub sentiment_score: f64,
    pub emotion: Emotion,
    pub toxic: bool,
    pub impact: f64,
    pub confidence: Confidence,
}

impl ScoredItem {
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.item.timestamp
    }

    pub fn text(&self) -> &str {
        &self.item.text
    }
}

/// Fixed-width window of the timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeBucket {
    pub start: DateTime<Utc>,
    /// Mean score of members; 0.0 for an empty bucket.
    pub mean: f64,
    pub count: usize,
}

/// Sharp negative swing between two consecutive buckets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Spike {
    pub at: DateTime<Utc>,
    /// |diff| rounded to 2 decimals.
    pub drop: f64,
    /// Lowest-scoring items from the evidence window, ascending by score.
    pub evidence: Vec<ScoredItem>,
}

/// Output of the aggregator: the charting series and the alert list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Timeline {
    pub buckets: Vec<TimeBucket>,
    pub spikes: Vec<Spike>,
}

pub(crate) fn round_to(x: f64, decimals: i32) -> f64 {
    let f = 10f64.powi(decimals);
    (x * f).round() / f
}
