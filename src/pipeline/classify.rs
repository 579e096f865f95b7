//! Heading vs. paragraph classification.
//!
//! A block is a heading when it is short and written entirely in capitals
//! (digits and whitespace allowed). When the parser reported font size or
//! weight, the block must additionally be large (> 14pt) or bold.

use crate::model::{BlockKind, TextStyle};
use once_cell::sync::Lazy;
use regex::Regex;

/// Uppercase letters, digits and whitespace; at least five characters.
static UPPERCASE_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z0-9\s]{5,}$").unwrap());

/// Headings are shorter than this many characters.
pub const MAX_HEADING_CHARS: usize = 100;

/// Font size (points) above which an uppercase block counts as a heading.
pub const HEADING_MIN_FONT_SIZE: f32 = 14.0;

fn looks_like_heading(text: &str) -> bool {
    text.chars().count() < MAX_HEADING_CHARS && UPPERCASE_LINE.is_match(text.trim())
}

/// Classify one block.
pub fn classify(text: &str, style: Option<&TextStyle>) -> BlockKind {
    if !looks_like_heading(text) {
        return BlockKind::Paragraph;
    }
    match style {
        Some(style) if style.has_font_metrics() => {
            let large = style
                .font_size
                .is_some_and(|size| size > HEADING_MIN_FONT_SIZE);
            if large || style.is_bold() {
                BlockKind::Heading
            } else {
                BlockKind::Paragraph
            }
        }
        _ => BlockKind::Heading,
    }
}
