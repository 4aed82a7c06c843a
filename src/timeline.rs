//! # Timeline
//! Fixed-width time buckets over scored items plus negative-spike detection.
//!
//! Buckets are epoch-aligned (floor of the earliest timestamp) and contiguous
//! up to the last timestamp: empty windows are kept with mean 0.0 and count 0
//! so the chart has no gaps. A spike is emitted at a bucket whose mean fell by
//! more than `spike_threshold` relative to the previous bucket; it carries the
//! lowest-scoring items of its evidence window as explanation.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::model::{round_to, ScoredItem, Spike, TimeBucket, Timeline};

pub const DEFAULT_BUCKET_MINUTES: u32 = 15;
pub const DEFAULT_SPIKE_THRESHOLD: f64 = 0.5;
pub const DEFAULT_MAX_EVIDENCE: usize = 3;
/// 30 days of 15-minute buckets.
pub const DEFAULT_MAX_BUCKETS: usize = 2880;

/// Which items explain a spike at bucket start `t` (bucket width `w`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvidenceWindow {
    /// Members of the spiking bucket: `[t, t + w)`.
    #[default]
    Bucket,
    /// The window ending at the spike: `[t - w, t]`. This is how the first
    /// dashboard backend picked its evidence.
    Trailing,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TimelineConfig {
    #[serde(default = "default_bucket_minutes")]
    pub bucket_minutes: u32,
    /// A spike needs `curr.mean - prev.mean < -spike_threshold`.
    #[serde(default = "default_spike_threshold")]
    pub spike_threshold: f64,
    #[serde(default = "default_max_evidence")]
    pub max_evidence: usize,
    #[serde(default)]
    pub evidence_window: EvidenceWindow,
    /// Longest timeline emitted. Older buckets are dropped, keeping the most
    /// recent span.
    #[serde(default = "default_max_buckets")]
    pub max_buckets: usize,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            bucket_minutes: DEFAULT_BUCKET_MINUTES,
            spike_threshold: DEFAULT_SPIKE_THRESHOLD,
            max_evidence: DEFAULT_MAX_EVIDENCE,
            evidence_window: EvidenceWindow::default(),
            max_buckets: DEFAULT_MAX_BUCKETS,
        }
    }
}

fn default_bucket_minutes() -> u32 {
    DEFAULT_BUCKET_MINUTES
}
fn default_spike_threshold() -> f64 {
    DEFAULT_SPIKE_THRESHOLD
}
fn default_max_evidence() -> usize {
    DEFAULT_MAX_EVIDENCE
}
fn default_max_buckets() -> usize {
    DEFAULT_MAX_BUCKETS
}

impl TimelineConfig {
    fn width(&self) -> Duration {
        Duration::minutes(i64::from(self.bucket_minutes.max(1)))
    }
}

/// Bucket the items and detect spikes. Input order does not matter.
pub fn build_timeline(items: &[ScoredItem], cfg: &TimelineConfig) -> Timeline {
    let mut sorted: Vec<&ScoredItem> = items.iter().collect();
    sorted.sort_by_key(|it| it.timestamp());

    let (Some(&first), Some(&last)) = (sorted.first(), sorted.last()) else {
        return Timeline::default();
    };

    let width = cfg.width();
    let mut origin = floor_to(first.timestamp(), width);
    let span = (last.timestamp() - origin).num_seconds() / width.num_seconds() + 1;
    let max_buckets = cfg.max_buckets.max(1);
    if span as usize > max_buckets {
        origin = floor_to(last.timestamp(), width) - width * (max_buckets as i32 - 1);
        let before = sorted.len();
        sorted.retain(|it| it.timestamp() >= origin);
        warn!(
            target: "timeline",
            span,
            max_buckets,
            dropped = before - sorted.len(),
            "timeline span capped; older items left out"
        );
    }
    let buckets = aggregate(&sorted, origin, last.timestamp(), width);
    let spikes = detect_spikes(&buckets, &sorted, cfg);

    debug!(
        target: "timeline",
        items = sorted.len(),
        buckets = buckets.len(),
        spikes = spikes.len(),
        "timeline built"
    );

    Timeline { buckets, spikes }
}

/// Contiguous buckets from `origin` through the one holding `last`.
fn aggregate(
    sorted: &[&ScoredItem],
    origin: DateTime<Utc>,
    last: DateTime<Utc>,
    width: Duration,
) -> Vec<TimeBucket> {
    let w = width.num_seconds();
    let n = ((last - origin).num_seconds() / w) as usize + 1;

    let mut sums = vec![0.0f64; n];
    let mut counts = vec![0usize; n];
    for it in sorted {
        let idx = ((it.timestamp() - origin).num_seconds() / w) as usize;
        sums[idx] += it.sentiment_score;
        counts[idx] += 1;
    }

    (0..n)
        .map(|i| TimeBucket {
            start: origin + width * i as i32,
            mean: if counts[i] > 0 {
                sums[i] / counts[i] as f64
            } else {
                0.0
            },
            count: counts[i],
        })
        .collect()
}

fn detect_spikes(
    buckets: &[TimeBucket],
    sorted: &[&ScoredItem],
    cfg: &TimelineConfig,
) -> Vec<Spike> {
    let width = cfg.width();

    buckets
        .windows(2)
        .filter_map(|pair| {
            let (prev, curr) = (&pair[0], &pair[1]);
            let diff = curr.mean - prev.mean;
            if diff >= -cfg.spike_threshold {
                return None;
            }

            let evidence = lowest_in_window(sorted, curr.start, width, cfg);
            let drop = round_to(diff.abs(), 2);
            info!(
                target: "timeline",
                at = %curr.start,
                drop,
                evidence = evidence.len(),
                "negative sentiment spike"
            );
            Some(Spike {
                at: curr.start,
                drop,
                evidence,
            })
        })
        .collect()
}

/// Up to `max_evidence` lowest-scoring items in the evidence window, ascending.
/// Ties keep chronological order.
fn lowest_in_window(
    sorted: &[&ScoredItem],
    at: DateTime<Utc>,
    width: Duration,
    cfg: &TimelineConfig,
) -> Vec<ScoredItem> {
    let in_window = |ts: DateTime<Utc>| match cfg.evidence_window {
        EvidenceWindow::Bucket => ts >= at && ts < at + width,
        EvidenceWindow::Trailing => ts >= at - width && ts <= at,
    };

    let mut hits: Vec<&ScoredItem> = sorted
        .iter()
        .copied()
        .filter(|it| in_window(it.timestamp()))
        .collect();
    hits.sort_by(|a, b| a.sentiment_score.total_cmp(&b.sentiment_score));
    hits.into_iter()
        .take(cfg.max_evidence)
        .cloned()
        .collect()
}

/// Floor `ts` to a multiple of `width` since the UNIX epoch.
fn floor_to(ts: DateTime<Utc>, width: Duration) -> DateTime<Utc> {
    let w = width.num_seconds();
    let rem = ts.timestamp().rem_euclid(w);
    ts - Duration::seconds(rem) - Duration::nanoseconds(i64::from(ts.timestamp_subsec_nanos()))
}
