//! Keyword emotion tagger.
//!
//! Categories are tested in [`EMOTION_TABLE`] order and the first category with
//! a keyword present wins, so the table order is the tie-break.

use super::rules::normalize;
use crate::model::Emotion;

pub const EMOTION_TABLE: &[(Emotion, &[&str])] = &[
    (Emotion::Anger, &["angry", "hate", "worst", "furious", "annoying"]),
    (Emotion::Joy, &["love", "great", "happy", "awesome", "amazing"]),
    (Emotion::Sadness, &["sad", "disappointed", "cry", "upset"]),
    (Emotion::Fear, &["scared", "worried", "afraid", "panic"]),
];

/// Tag `text` with an emotion. Absent or empty text is `Neutral`.
pub fn emotion(text: Option<&str>) -> Emotion {
    let Some(raw) = text.filter(|t| !t.is_empty()) else {
        return Emotion::Neutral;
    };
    let t = normalize(raw);

    EMOTION_TABLE
        .iter()
        .find(|(_, words)| words.iter().any(|w| t.contains(w)))
        .map(|(e, _)| *e)
        .unwrap_or(Emotion::Neutral)
}
