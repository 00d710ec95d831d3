//! Content-quality filter.

use crate::message::{CommentEntry, MAX_TIME_SECONDS};

/// Boilerplate that carries no information about the moment it is posted at.
pub const DEFAULT_DENYLIST: &[&str] = &[
    "弹幕来了",
    "弹幕来啦",
    "前排",
    "前排围观",
    "沙发",
    "打卡",
    "好看",
    "好好看",
    "太好看了",
    "666",
];

/// Rejects comments that are empty, too short or long, pure symbols or
/// digits, boilerplate, or placed outside the valid time range.
#[derive(Debug, Clone)]
pub struct ContentFilter {
    pub min_chars: usize,
    pub max_chars: usize,
    /// Compared against the text lowercased with whitespace removed
    pub denylist: Vec<String>,
}

impl Default for ContentFilter {
    fn default() -> Self {
        Self {
            min_chars: 2,
            max_chars: 50,
            denylist: DEFAULT_DENYLIST.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ContentFilter {
    /// True when `time` is finite and within `[0, 86400]`.
    pub fn is_valid_time(time: f64) -> bool {
        time.is_finite() && (0.0..=MAX_TIME_SECONDS).contains(&time)
    }

    /// Trimmed `text` if it is worth keeping.
    pub fn clean_text(&self, text: &str) -> Option<String> {
        let text = text.trim();
        let chars = text.chars().count();
        if chars < self.min_chars || chars > self.max_chars {
            return None;
        }
        if text.chars().all(|c| !c.is_alphanumeric()) {
            return None;
        }
        if text.chars().all(|c| c.is_numeric() || c.is_whitespace()) {
            return None;
        }

        let folded: String = text
            .chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect();
        if self.denylist.iter().any(|phrase| *phrase == folded) {
            return None;
        }
        Some(text.to_string())
    }

    /// `entry` with trimmed text, or `None` if it is rejected.
    pub fn admit(&self, mut entry: CommentEntry) -> Option<CommentEntry> {
        if !Self::is_valid_time(entry.time_seconds) {
            return None;
        }
        entry.text = self.clean_text(&entry.text)?;
        Some(entry)
    }

    /// Keep the admitted entries, in order.
    pub fn apply(&self, entries: impl IntoIterator<Item = CommentEntry>) -> Vec<CommentEntry> {
        entries
            .into_iter()
            .filter_map(|entry| self.admit(entry))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_bounds() {
        let filter = ContentFilter::default();
        assert!(filter.clean_text("好").is_none());
        assert_eq!(filter.clean_text("  好家伙  ").as_deref(), Some("好家伙"));
        assert!(filter.clean_text(&"啊".repeat(50)).is_some());
        assert!(filter.clean_text(&"啊".repeat(51)).is_none());
        assert!(filter.clean_text("   ").is_none());
        assert!(filter.clean_text("").is_none());
    }

    #[test]
    fn test_symbols_and_numbers() {
        let filter = ContentFilter::default();
        assert!(filter.clean_text("？？？").is_none());
        assert!(filter.clean_text("!!!...").is_none());
        assert!(filter.clean_text("12345").is_none());
        assert!(filter.clean_text("2333 哈").is_some());
        assert!(filter.clean_text("第1集开始").is_some());
    }

    #[test]
    fn test_denylist() {
        let filter = ContentFilter::default();
        assert!(filter.clean_text("弹幕来了").is_none());
        assert!(filter.clean_text("前 排").is_none());
        assert!(filter.clean_text("666").is_none());
        assert!(filter.clean_text("这段666").is_some());
    }

    #[test]
    fn test_time_range() {
        let filter = ContentFilter::default();
        assert!(filter.admit(CommentEntry::new("正常弹幕", 0.0)).is_some());
        assert!(filter.admit(CommentEntry::new("正常弹幕", 86_400.0)).is_some());
        assert!(filter.admit(CommentEntry::new("正常弹幕", -0.5)).is_none());
        assert!(filter.admit(CommentEntry::new("正常弹幕", 86_400.5)).is_none());
        assert!(filter.admit(CommentEntry::new("正常弹幕", f64::NAN)).is_none());
        assert!(filter.admit(CommentEntry::new("正常弹幕", f64::INFINITY)).is_none());
    }
}
