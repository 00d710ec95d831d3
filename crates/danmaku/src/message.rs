//! Comment types.
//!
//! Core structures for one time-coded comment and for what a provider
//! returned for one platform.

use serde::{Deserialize, Serialize};

/// Color used when a source gives none or an unreadable one.
pub const DEFAULT_COLOR: &str = "#FFFFFF";

/// Latest accepted comment time, in seconds (24 hours).
pub const MAX_TIME_SECONDS: f64 = 86_400.0;

/// How a comment moves across the player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DanmuMode {
    /// Scrolls right to left
    #[default]
    Scroll,
    /// Pinned to the top
    Top,
    /// Pinned to the bottom
    Bottom,
}

impl DanmuMode {
    /// Map a markup source mode code: 4 is top, 5 is bottom, anything else scrolls.
    pub fn from_source_code(code: i64) -> Self {
        match code {
            4 => Self::Top,
            5 => Self::Bottom,
            _ => Self::Scroll,
        }
    }

    /// Inverse of [`DanmuMode::from_source_code`].
    pub fn source_code(self) -> u8 {
        match self {
            Self::Scroll => 1,
            Self::Top => 4,
            Self::Bottom => 5,
        }
    }

    /// Numeric DPlayer position: 1 top, 2 bottom.
    pub fn from_position_code(code: i64) -> Self {
        match code {
            1 => Self::Top,
            2 => Self::Bottom,
            _ => Self::Scroll,
        }
    }

    /// Map a JSON provider position.
    ///
    /// Accepts names (`top`, `bottom`, `right`, `scroll`) and numeric
    /// player positions (1 top, 2 bottom, 0 scroll).
    pub fn from_position(position: &str) -> Self {
        match position.trim().to_ascii_lowercase().as_str() {
            "top" | "1" => Self::Top,
            "bottom" | "2" => Self::Bottom,
            _ => Self::Scroll,
        }
    }
}

/// A single time-coded comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentEntry {
    /// Comment text, trimmed
    pub text: String,
    /// Offset into the video, in seconds
    pub time_seconds: f64,
    /// `#RRGGBB`, uppercase
    pub color: String,
    pub mode: DanmuMode,
}

impl CommentEntry {
    /// Create a white scrolling comment.
    pub fn new(text: impl Into<String>, time_seconds: f64) -> Self {
        Self {
            text: text.into(),
            time_seconds,
            color: DEFAULT_COLOR.to_string(),
            mode: DanmuMode::Scroll,
        }
    }

    /// Set the color of the comment.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Set the mode of the comment.
    pub fn with_mode(mut self, mode: DanmuMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Which kind of provider produced a platform's comments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderTier {
    /// No provider returned anything
    #[default]
    None,
    /// User-configured endpoint
    Custom,
    /// Third-party markup provider
    Markup,
    /// Third-party JSON provider
    Json,
}

/// Comments obtained for one platform link.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderResult {
    pub platform: String,
    pub comments: Vec<CommentEntry>,
    pub provider_tier: ProviderTier,
}

impl ProviderResult {
    /// A result with no comments.
    pub fn empty(platform: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            comments: Vec::new(),
            provider_tier: ProviderTier::None,
        }
    }

    /// Number of comments.
    pub fn count(&self) -> usize {
        self.comments.len()
    }
}

/// Format a packed `0xRRGGBB` integer as `#RRGGBB`.
///
/// Values outside the 24-bit range fall back to [`DEFAULT_COLOR`].
pub fn format_color(value: i64) -> String {
    if !(0..=0xFF_FFFF).contains(&value) {
        return DEFAULT_COLOR.to_string();
    }
    format!("#{value:06X}")
}

/// Normalize a color given as a decimal integer, `#rgb` or `#rrggbb`.
pub fn parse_color(raw: &str) -> String {
    let raw = raw.trim();
    if let Some(hex) = raw.strip_prefix('#') {
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return DEFAULT_COLOR.to_string();
        }
        return match hex.len() {
            6 => format!("#{}", hex.to_ascii_uppercase()),
            3 => {
                let expanded: String = hex.chars().flat_map(|c| [c, c]).collect();
                format!("#{}", expanded.to_ascii_uppercase())
            }
            _ => DEFAULT_COLOR.to_string(),
        };
    }
    match raw.parse::<i64>() {
        Ok(value) => format_color(value),
        Err(_) => DEFAULT_COLOR.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_mapping() {
        assert_eq!(DanmuMode::from_source_code(4), DanmuMode::Top);
        assert_eq!(DanmuMode::from_source_code(5), DanmuMode::Bottom);
        assert_eq!(DanmuMode::from_source_code(1), DanmuMode::Scroll);
        assert_eq!(DanmuMode::from_source_code(7), DanmuMode::Scroll);

        for mode in [DanmuMode::Scroll, DanmuMode::Top, DanmuMode::Bottom] {
            assert_eq!(DanmuMode::from_source_code(mode.source_code() as i64), mode);
        }

        assert_eq!(DanmuMode::from_position("top"), DanmuMode::Top);
        assert_eq!(DanmuMode::from_position("2"), DanmuMode::Bottom);
        assert_eq!(DanmuMode::from_position("right"), DanmuMode::Scroll);
    }

    #[test]
    fn test_colors() {
        assert_eq!(format_color(16777215), "#FFFFFF");
        assert_eq!(format_color(0xff0000), "#FF0000");
        assert_eq!(format_color(255), "#0000FF");
        assert_eq!(format_color(-1), DEFAULT_COLOR);
        assert_eq!(format_color(0x1_000_000), DEFAULT_COLOR);

        assert_eq!(parse_color("#fe0302"), "#FE0302");
        assert_eq!(parse_color("#abc"), "#AABBCC");
        assert_eq!(parse_color("16711680"), "#FF0000");
        assert_eq!(parse_color("rgb(1,2,3)"), DEFAULT_COLOR);
        assert_eq!(parse_color("#zzzzzz"), DEFAULT_COLOR);
        assert_eq!(parse_color(""), DEFAULT_COLOR);
    }

    #[test]
    fn test_entry_serializes_camel_case() {
        let entry = CommentEntry::new("前方高能", 12.5).with_mode(DanmuMode::Top);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["timeSeconds"], 12.5);
        assert_eq!(json["mode"], "top");
        assert_eq!(json["color"], "#FFFFFF");
    }
}
