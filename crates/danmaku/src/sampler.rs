//! Density control for very dense comment streams.
//!
//! Comments are bucketed by fixed time windows and each bucket is capped;
//! whatever still exceeds the overall cap goes through a final sampling pass
//! that always keeps the first and last comment.

use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::message::CommentEntry;

/// Entries processed between two cooperative yields.
pub const YIELD_EVERY: usize = 500;

/// How a full bucket decides whether a new comment replaces an old one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplacementPolicy {
    /// Fixed replacement probability; recent comments are over-represented.
    #[default]
    Approximate,
    /// Uniform reservoir sample (Algorithm R) of everything the bucket saw.
    Reservoir,
}

/// Configuration for density control.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DensityConfig {
    /// Bucket width in seconds
    pub bucket_secs: f64,
    /// Maximum entries kept per bucket
    pub bucket_capacity: usize,
    /// Chance a new comment overwrites a random entry of a full bucket
    pub replace_probability: f64,
    /// Hard cap on the total after bucketing
    pub max_total: usize,
    pub replacement: ReplacementPolicy,
}

impl Default for DensityConfig {
    fn default() -> Self {
        Self {
            bucket_secs: 300.0,
            bucket_capacity: 500,
            replace_probability: 0.1,
            max_total: 20_000,
            replacement: ReplacementPolicy::Approximate,
        }
    }
}

#[derive(Debug, Default)]
struct Bucket {
    entries: Vec<CommentEntry>,
    /// Entries offered to this bucket so far
    seen: u64,
}

/// Bounds comments per time bucket.
#[derive(Debug)]
pub struct DensityController<R = StdRng> {
    config: DensityConfig,
    buckets: BTreeMap<u64, Bucket>,
    rng: R,
}

impl DensityController<StdRng> {
    /// Create a controller with a freshly seeded RNG.
    pub fn new(config: DensityConfig) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(rand::random()))
    }
}

impl<R: RngExt> DensityController<R> {
    /// Create a controller driven by `rng`.
    pub fn with_rng(config: DensityConfig, rng: R) -> Self {
        Self {
            config,
            buckets: BTreeMap::new(),
            rng,
        }
    }

    fn bucket_index(&self, time: f64) -> u64 {
        let width = if self.config.bucket_secs > 0.0 {
            self.config.bucket_secs
        } else {
            300.0
        };
        (time.max(0.0) / width).floor() as u64
    }

    /// Offer one entry.
    pub fn push(&mut self, entry: CommentEntry) {
        let index = self.bucket_index(entry.time_seconds);
        let capacity = self.config.bucket_capacity;
        let bucket = self.buckets.entry(index).or_default();
        bucket.seen += 1;

        if bucket.entries.len() < capacity {
            bucket.entries.push(entry);
            return;
        }
        if capacity == 0 {
            return;
        }

        match self.config.replacement {
            ReplacementPolicy::Approximate => {
                let p = self.config.replace_probability.clamp(0.0, 1.0);
                if self.rng.random_bool(p) {
                    let slot = self.rng.random_range(0..capacity);
                    bucket.entries[slot] = entry;
                }
            }
            ReplacementPolicy::Reservoir => {
                let slot = self.rng.random_range(0..bucket.seen);
                if (slot as usize) < capacity {
                    bucket.entries[slot as usize] = entry;
                }
            }
        }
    }

    /// Entries currently held.
    pub fn len(&self) -> usize {
        self.buckets.values().map(|b| b.entries.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Largest bucket size; never above the configured capacity.
    pub fn max_bucket_len(&self) -> usize {
        self.buckets
            .values()
            .map(|b| b.entries.len())
            .max()
            .unwrap_or(0)
    }

    /// Buckets in time order, each sorted by time (stable).
    pub fn finish(self) -> Vec<CommentEntry> {
        let mut out = Vec::with_capacity(self.len());
        for (_, mut bucket) in self.buckets {
            bucket
                .entries
                .sort_by(|a, b| a.time_seconds.total_cmp(&b.time_seconds));
            out.extend(bucket.entries);
        }
        out
    }
}

/// Reduce `entries` to at most `cap`, keeping the first and the last.
///
/// The middle range is split into `cap - 2` equal strides and one entry is
/// drawn at random from each, so the kept entries spread over the whole
/// timeline. `entries` is expected in time order.
pub fn sample_to_cap<R: RngExt>(
    entries: Vec<CommentEntry>,
    cap: usize,
    rng: &mut R,
) -> Vec<CommentEntry> {
    let total = entries.len();
    if total <= cap {
        return entries;
    }
    if cap < 2 {
        return entries.into_iter().take(cap).collect();
    }

    // total > cap >= 2, so every stride holds at least one middle entry
    let middle = (total - 2) as u64;
    let slots = (cap - 2) as u64;
    let mut picks = (0..slots).map(|k| {
        let lo = k * middle / slots;
        let hi = (k + 1) * middle / slots;
        1 + rng.random_range(lo..hi) as usize
    });

    let last_index = total - 1;
    let mut next_pick = picks.next();
    let mut out = Vec::with_capacity(cap);
    for (index, entry) in entries.into_iter().enumerate() {
        if index == 0 || index == last_index {
            out.push(entry);
        } else if next_pick == Some(index) {
            out.push(entry);
            next_pick = picks.next();
        }
    }
    out
}

/// Bucket `entries` and enforce the overall cap.
///
/// Yields to the runtime every [`YIELD_EVERY`] entries so one dense platform
/// does not hold a worker thread for the whole pass.
pub async fn bound_density(entries: Vec<CommentEntry>, config: &DensityConfig) -> Vec<CommentEntry> {
    let input = entries.len();
    let mut controller = DensityController::new(config.clone());
    for (index, entry) in entries.into_iter().enumerate() {
        controller.push(entry);
        if (index + 1) % YIELD_EVERY == 0 {
            tokio::task::yield_now().await;
        }
    }

    let bucketed = controller.finish();
    let output = if bucketed.len() > config.max_total {
        let mut rng = StdRng::seed_from_u64(rand::random());
        sample_to_cap(bucketed, config.max_total, &mut rng)
    } else {
        bucketed
    };

    if output.len() < input {
        tracing::debug!(input, output = output.len(), "Density bound applied");
    }
    output
}
