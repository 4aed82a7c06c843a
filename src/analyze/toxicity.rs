//! Toxicity flag. Independent of the intent-override score adjustment.

use super::rules::{count_hits, normalize};

pub const TOXIC_KEYWORDS: &[&str] = &[
    "idiot",
    "stupid",
    "moron",
    "dumb",
    "shut up",
    "kill yourself",
    "loser",
    "hate you",
    "trash",
    "garbage",
    "pathetic",
    "disgusting",
];

pub fn is_toxic(text: &str) -> bool {
    count_hits(&normalize(text), TOXIC_KEYWORDS) > 0
}
