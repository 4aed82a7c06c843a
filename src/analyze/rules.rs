//! Intent-override rules: reconcile a signed sentiment score with lexical
//! evidence from the text.
//!
//! Keyword hits are case-insensitive substring matches. Policy, first match wins:
//! - two or more negative hits while the score claims positive: subtract
//!   [`NEGATIVE_OVERRIDE_PENALTY`], confidence low
//! - both negative and positive hits: scale by [`MIXED_SIGNAL_SCALE`], confidence low
//! - otherwise: unchanged, confidence high

use crate::model::Confidence;

pub const NEGATIVE_KEYWORDS: &[&str] = &[
    "worst",
    "hate",
    "terrible",
    "awful",
    "bad",
    "trash",
    "garbage",
    "pathetic",
    "disappointing",
    "boring",
    "useless",
];

pub const POSITIVE_KEYWORDS: &[&str] = &[
    "love",
    "amazing",
    "great",
    "awesome",
    "fantastic",
    "excellent",
    "best",
];

pub const NEGATIVE_OVERRIDE_PENALTY: f64 = 0.6;
pub const MIXED_SIGNAL_SCALE: f64 = 0.4;

/// Keyword hit counts for one text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeywordHits {
    pub negative: usize,
    pub positive: usize,
}

pub fn keyword_hits(text: &str) -> KeywordHits {
    let t = normalize(text);
    KeywordHits {
        negative: count_hits(&t, NEGATIVE_KEYWORDS),
        positive: count_hits(&t, POSITIVE_KEYWORDS),
    }
}

/// Apply the override policy. Returns the adjusted score and its confidence.
pub fn intent_override(text: &str, score: f64) -> (f64, Confidence) {
    let hits = keyword_hits(text);

    if hits.negative >= 2 && score > 0.0 {
        return (score - NEGATIVE_OVERRIDE_PENALTY, Confidence::Low);
    }
    if hits.negative > 0 && hits.positive > 0 {
        return (score * MIXED_SIGNAL_SCALE, Confidence::Low);
    }
    (score, Confidence::High)
}

// --- shared lexicon helpers ---

/// Number of keywords (not occurrences) present in an already-normalized text.
pub(crate) fn count_hits(normalized: &str, keywords: &[&str]) -> usize {
    keywords.iter().filter(|k| normalized.contains(*k)).count()
}

/// Lowercase and collapse whitespace runs into single spaces.
pub(crate) fn normalize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last_space = false;
    for ch in input.chars().flat_map(char::to_lowercase) {
        if ch.is_whitespace() {
            if !last_space {
                out.push(' ');
                last_space = true;
            }
        } else {
            out.push(ch);
            last_space = false;
        }
    }
    out.trim().to_string()
}
