//! XML export.
//!
//! Writes merged comments as `<d p="time,mode,color,size">text</d>` fragments,
//! the attribute order [`crate::parser`] reads, so an export parses back.
//! Times are written as the shortest decimal that reads back to the same
//! `f64`.

use std::fmt::Write as _;

use crate::message::{CommentEntry, DEFAULT_COLOR};

/// Font size written for every comment.
const FONT_SIZE: u8 = 25;

/// Render `entries` as a complete XML document.
pub fn to_xml(entries: &[CommentEntry]) -> String {
    let mut xml = String::with_capacity(64 + entries.len() * 64);
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<i>\n");
    for entry in entries {
        let _ = writeln!(
            xml,
            "  <d p=\"{},{},{},{}\">{}</d>",
            entry.time_seconds,
            entry.mode.source_code(),
            color_to_int(&entry.color),
            FONT_SIZE,
            escape_xml(&entry.text),
        );
    }
    xml.push_str("</i>\n");
    xml
}

/// `#RRGGBB` back to its packed integer.
pub fn color_to_int(color: &str) -> u32 {
    let hex = color.trim().trim_start_matches('#');
    u32::from_str_radix(hex, 16)
        .or_else(|_| u32::from_str_radix(DEFAULT_COLOR.trim_start_matches('#'), 16))
        .unwrap_or(0xFF_FFFF)
}

/// Escape special XML characters in a string.
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
