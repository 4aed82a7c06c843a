//! Impact scoring: how much an item's sentiment is amplified by engagement.
//!
//! impact = |score| * (1 + ln(1 + likes + RETWEET_WEIGHT * retweets))
//!
//! Monotonic non-decreasing in |score|, likes and retweets; zero whenever the
//! score is zero. Result rounded to 3 decimals.

use crate::model::round_to;

/// A retweet pushes the item to a new audience, a like does not.
pub const RETWEET_WEIGHT: f64 = 2.0;

pub fn impact_score(score: f64, likes: u64, retweets: u64) -> f64 {
    let engagement = likes as f64 + RETWEET_WEIGHT * retweets as f64;
    let amplification = 1.0 + engagement.ln_1p();
    round_to(score.abs() * amplification, 3)
}
