// src/analyze/mod.rs
//! Record synthesis: joins classifier output with the lexicon signals into
//! one `ScoredItem` per corpus item.
//!
//! Order per item:
//! 1) validate the classifier score
//! 2) emotion + toxicity + intent override
//! 3) cross-signal mixed check against the classifier's claim
//! 4) confidence = intent OR mixed; impact from the final score

pub mod adapter;
pub mod debug;
pub mod emotion;
pub mod rules;
pub mod scoring;
pub mod toxicity;

use std::borrow::Borrow;
use std::time::Instant;

use metrics::{counter, histogram};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::error::AnalysisError;
use crate::model::{round_to, Confidence, Emotion, Item, ScoredItem};

// Re-export convenient types.
pub use crate::analyze::adapter::{Sentiment, SentimentClassifier};
pub use crate::analyze::emotion::emotion;
pub use crate::analyze::rules::intent_override;
pub use crate::analyze::scoring::impact_score;
pub use crate::analyze::toxicity::is_toxic;

/// |score| above which a contradicting emotion marks the item as mixed.
pub const MIXED_SIGNAL_MARGIN: f64 = 0.3;

/// True when the score's polarity contradicts the keyword emotion.
pub fn mixed_signal(score: f64, emotion: Emotion) -> bool {
    (score > MIXED_SIGNAL_MARGIN && emotion.is_negative())
        || (score < -MIXED_SIGNAL_MARGIN && emotion == Emotion::Joy)
}

/// Score one item against its classifier verdict.
pub fn score_item(
    index: usize,
    item: &Item,
    sentiment: Sentiment,
) -> Result<ScoredItem, AnalysisError> {
    let raw = sentiment.score;
    if !raw.is_finite() || raw.abs() > 1.0 {
        return Err(AnalysisError::ItemProcessing {
            index,
            reason: format!("classifier score {raw} outside [-1, 1]"),
        });
    }

    let emotion = emotion(Some(item.text.as_str()));
    let toxic = is_toxic(&item.text);
    let (adjusted, intent_conf) = intent_override(&item.text, raw);
    let mixed_conf = if mixed_signal(raw, emotion) {
        Confidence::Low
    } else {
        Confidence::High
    };

    let sentiment_score = round_to(adjusted.clamp(-1.0, 1.0), 3);
    Ok(ScoredItem {
        item: item.clone(),
        sentiment_label: sentiment.label,
        sentiment_score,
        emotion,
        toxic,
        impact: impact_score(sentiment_score, item.likes, item.retweets),
        confidence: intent_conf.or(mixed_conf),
    })
}

/// Classify the whole batch once, then score every item.
///
/// A classifier failure (or a result of the wrong length) fails the batch with
/// no partial output. Items that fail individually are logged and skipped.
pub async fn synthesize<I>(
    items: &[I],
    classifier: &dyn SentimentClassifier,
) -> Result<Vec<ScoredItem>, AnalysisError>
where
    I: Borrow<Item> + Sync,
{
    if items.is_empty() {
        return Ok(Vec::new());
    }

    let items: Vec<&Item> = items.iter().map(Borrow::borrow).collect();
    let texts: Vec<String> = items.iter().map(|it| it.text.clone()).collect();
    histogram!("analyze_batch_size").record(texts.len() as f64);

    let started = Instant::now();
    let verdicts = classifier.classify_batch(&texts).await?;
    if verdicts.len() != items.len() {
        return Err(AnalysisError::AdapterFailure(format!(
            "{} returned {} verdicts for {} texts",
            classifier.provider_name(),
            verdicts.len(),
            items.len()
        )));
    }
    debug!(
        target: "synth",
        provider = classifier.provider_name(),
        n = texts.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "batch classified"
    );

    let results: Vec<Result<ScoredItem, AnalysisError>> = items
        .iter()
        .zip(verdicts)
        .enumerate()
        .map(|(i, (it, v))| score_item(i, it, v))
        .collect();

    let mut scored = Vec::with_capacity(results.len());
    for res in results {
        match res {
            Ok(s) => scored.push(s),
            Err(e) => {
                if let AnalysisError::ItemProcessing { index, .. } = &e {
                    let id = anon_hash(&items[*index].text);
                    warn!(target: "synth", %id, error = %e, "skipping item");
                }
                counter!("analyze_items_skipped_total").increment(1);
            }
        }
    }
    Ok(scored)
}

/// Short stable id for logs. Raw text never goes to the log.
pub(crate) fn anon_hash(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::adapter::{FailingClassifier, MockClassifier};
    use super::*;
    use crate::model::SentimentLabel;
    use chrono::{TimeZone, Utc};

    fn item(text: &str) -> Item {
        Item::new(text, Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(), 10, 2)
    }

    #[test]
    fn mixed_signal_table() {
        assert!(mixed_signal(0.5, Emotion::Anger));
        assert!(mixed_signal(0.31, Emotion::Fear));
        assert!(mixed_signal(-0.4, Emotion::Joy));
        assert!(!mixed_signal(0.3, Emotion::Sadness));
        assert!(!mixed_signal(-0.9, Emotion::Anger));
        assert!(!mixed_signal(0.9, Emotion::Joy));
        assert!(!mixed_signal(0.9, Emotion::Neutral));
    }

    #[test]
    fn intent_override_feeds_final_score() {
        let it = item("worst awful terrible experience");
        let s = score_item(0, &it, Sentiment::new(SentimentLabel::Positive, 0.5)).unwrap();
        assert!((s.sentiment_score + 0.1).abs() < 1e-9);
        assert_eq!(s.confidence, Confidence::Low);
        assert_eq!(s.emotion, Emotion::Anger);
        assert_eq!(s.sentiment_label, SentimentLabel::Positive);
    }

    #[test]
    fn mixed_emotion_alone_lowers_confidence() {
        // no intent keywords, but "scared" contradicts a strongly positive claim
        let it = item("honestly scared of how this went");
        let s = score_item(0, &it, Sentiment::new(SentimentLabel::Positive, 0.8)).unwrap();
        assert_eq!(s.sentiment_score, 0.8);
        assert_eq!(s.emotion, Emotion::Fear);
        assert_eq!(s.confidence, Confidence::Low);
    }

    #[test]
    fn consistent_signals_stay_high() {
        let it = item("so happy with the new release");
        let s = score_item(0, &it, Sentiment::new(SentimentLabel::Positive, 0.9)).unwrap();
        assert_eq!(s.confidence, Confidence::High);
        assert!(!s.toxic);
        assert!(s.impact > 0.9);
    }

    #[test]
    fn out_of_range_score_is_an_item_failure() {
        let it = item("anything");
        let err = score_item(4, &it, Sentiment::new(SentimentLabel::Positive, 1.7)).unwrap_err();
        assert!(matches!(err, AnalysisError::ItemProcessing { index: 4, .. }));
        let err = score_item(0, &it, Sentiment::new(SentimentLabel::Neutral, f64::NAN));
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn bad_items_are_skipped_not_fatal() {
        let items = vec![item("first"), item("second"), item("third")];
        let clf = MockClassifier::default()
            .with("first", SentimentLabel::Positive, 0.4)
            .with("second", SentimentLabel::Positive, f64::INFINITY)
            .with("third", SentimentLabel::Negative, -0.6);
        let out = synthesize(&items, &clf).await.unwrap();
        let texts: Vec<&str> = out.iter().map(|s| s.text()).collect();
        assert_eq!(texts, vec!["first", "third"]);
    }

    #[tokio::test]
    async fn adapter_failure_fails_the_batch() {
        let items = vec![item("a"), item("b")];
        let err = synthesize(&items, &FailingClassifier).await.unwrap_err();
        assert!(matches!(err, AnalysisError::AdapterFailure(_)));
    }

    #[tokio::test]
    async fn empty_batch_skips_the_classifier() {
        let items: Vec<Item> = Vec::new();
        let out = synthesize(&items, &FailingClassifier).await.unwrap();
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn repeated_runs_are_identical() {
        let items = vec![
            item("I love this but it was terrible"),
            item("you idiot, worst take ever"),
            item("a quiet afternoon"),
        ];
        let clf = adapter::LexiconClassifier::new();
        let refs: Vec<&Item> = items.iter().collect();
        let a = synthesize(&refs, &clf).await.unwrap();
        let b = synthesize(&refs, &clf).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 3);
        assert!(a[1].toxic);
    }

    #[test]
    fn anon_hash_is_short_and_stable() {
        let a = anon_hash("hello");
        assert_eq!(a.len(), 12);
        assert_eq!(a, anon_hash("hello"));
        assert_ne!(a, anon_hash("hello!"));
    }
}
