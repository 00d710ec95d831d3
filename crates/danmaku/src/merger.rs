//! Cross-platform merge and deduplication.

use rustc_hash::FxHashSet;

use crate::message::CommentEntry;

/// Entries deduplicated between two cooperative yields.
pub const MERGE_BATCH: usize = 1000;

/// `(time in hundredths of a second, lowercased trimmed text, color or "default")`
pub type DedupKey = (i64, String, String);

/// Identity of a comment across platforms.
pub fn dedup_key(entry: &CommentEntry) -> DedupKey {
    let color = entry.color.trim();
    (
        (entry.time_seconds * 100.0).round() as i64,
        entry.text.trim().to_lowercase(),
        if color.is_empty() {
            "default".to_string()
        } else {
            color.to_ascii_uppercase()
        },
    )
}

fn concat_sorted(platforms: Vec<Vec<CommentEntry>>) -> Vec<CommentEntry> {
    let mut all: Vec<CommentEntry> = platforms.into_iter().flatten().collect();
    // stable: equal times keep platform order
    all.sort_by(|a, b| a.time_seconds.total_cmp(&b.time_seconds));
    all
}

/// Concatenate, sort by time and drop repeats; the first occurrence wins.
pub fn merge_and_dedup(platforms: Vec<Vec<CommentEntry>>) -> Vec<CommentEntry> {
    let mut seen = FxHashSet::default();
    concat_sorted(platforms)
        .into_iter()
        .filter(|entry| seen.insert(dedup_key(entry)))
        .collect()
}

/// [`merge_and_dedup`], yielding to the runtime after every [`MERGE_BATCH`] entries.
pub async fn merge_platforms(platforms: Vec<Vec<CommentEntry>>) -> Vec<CommentEntry> {
    let all = concat_sorted(platforms);
    let total = all.len();
    let mut seen = FxHashSet::default();
    let mut merged = Vec::with_capacity(total);

    let mut entries = all.into_iter().peekable();
    while entries.peek().is_some() {
        for entry in entries.by_ref().take(MERGE_BATCH) {
            if seen.insert(dedup_key(&entry)) {
                merged.push(entry);
            }
        }
        tokio::task::yield_now().await;
    }

    tracing::debug!(total, merged = merged.len(), "Merged platform comments");
    merged
}
