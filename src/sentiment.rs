//! Local lexicon sentiment scorer.
//!
//! Sums per-word scores from `sentiment_lexicon.json`, flipping the sign of a
//! word preceded by a negator within the last three tokens, then squashes the
//! raw sum into [-1, 1].

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::model::SentimentLabel;

static LEXICON: Lazy<HashMap<String, i32>> = Lazy::new(|| {
    let raw = include_str!("../sentiment_lexicon.json");
    serde_json::from_str::<HashMap<String, i32>>(raw).unwrap_or_default()
});

/// Normalization constant for the squash: raw / sqrt(raw^2 + ALPHA).
const ALPHA: f64 = 15.0;

/// |score| below this is reported as Neutral.
pub const NEUTRAL_BAND: f64 = 0.05;

#[derive(Debug, Clone, Default)]
pub struct SentimentAnalyzer;

impl SentimentAnalyzer {
    pub fn new() -> Self {
        Self
    }

    #[inline]
    fn word_score(&self, w: &str) -> i32 {
        *LEXICON.get(w).unwrap_or(&0)
    }

    /// Returns (raw lexicon sum, token count).
    pub fn score_text(&self, text: &str) -> (i32, usize) {
        // indexed access: negation looks back over previous tokens
        let tokens: Vec<String> = tokenize(text).collect();
        let mut score: i32 = 0;

        for i in 0..tokens.len() {
            let w = tokens[i].as_str();
            let negated = (1..=3).any(|k| i >= k && is_negator(tokens[i - k].as_str()));

            let base = self.word_score(w);
            if base != 0 {
                score += if negated { -base } else { base };
            }
        }

        (score, tokens.len())
    }

    /// Label plus signed score in [-1, 1]. Neutral always carries 0.0.
    pub fn classify(&self, text: &str) -> (SentimentLabel, f64) {
        let (raw, _) = self.score_text(text);
        let signed = squash(raw);
        if signed > NEUTRAL_BAND {
            (SentimentLabel::Positive, signed)
        } else if signed < -NEUTRAL_BAND {
            (SentimentLabel::Negative, signed)
        } else {
            (SentimentLabel::Neutral, 0.0)
        }
    }
}

fn squash(raw: i32) -> f64 {
    let r = raw as f64;
    (r / (r * r + ALPHA).sqrt()).clamp(-1.0, 1.0)
}

/// Alphanumeric (plus apostrophe) lower-case tokens.
fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

fn is_negator(tok: &str) -> bool {
    matches!(
        tok,
        "not"
            | "no"
            | "never"
            | "isn't"
            | "wasn't"
            | "aren't"
            | "won't"
            | "can't"
            | "cannot"
            | "don't"
            | "doesn't"
            | "didn't"
            | "without"
    )
}
