//! Debug endpoint: inspect what the lexicon layer makes of a text.
//! Mount with e.g. `app.merge(analyze::debug::router())`.

use serde::{Deserialize, Serialize};
use shuttle_axum::axum::{extract::Query, routing::get, Json, Router};

use super::{emotion, intent_override, is_toxic, mixed_signal, rules::keyword_hits};
use crate::model::{Confidence, Emotion};

#[derive(Debug, Deserialize)]
pub struct LexiconQuery {
    pub text: String,
    /// Candidate classifier score to run the override rules against.
    #[serde(default)]
    pub score: f64,
}

#[derive(Debug, Serialize)]
pub struct LexiconOut {
    pub emotion: Emotion,
    pub toxic: bool,
    pub negative_hits: usize,
    pub positive_hits: usize,
    pub adjusted_score: f64,
    pub intent_confidence: Confidence,
    pub mixed_signal: bool,
}

pub fn router() -> Router {
    Router::new().route("/debug/lexicon", get(get_lexicon))
}

pub fn inspect(text: &str, score: f64) -> LexiconOut {
    let hits = keyword_hits(text);
    let emo = emotion(Some(text));
    let (adjusted_score, intent_confidence) = intent_override(text, score);
    LexiconOut {
        emotion: emo,
        toxic: is_toxic(text),
        negative_hits: hits.negative,
        positive_hits: hits.positive,
        adjusted_score,
        intent_confidence,
        mixed_signal: mixed_signal(score, emo),
    }
}

async fn get_lexicon(Query(q): Query<LexiconQuery>) -> Json<LexiconOut> {
    Json(inspect(&q.text, q.score.clamp(-1.0, 1.0)))
}
