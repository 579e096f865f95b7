//! Block typography: font, size, weight, colour, alignment.
//!
//! Styles are only derived from what the parser reported; a block without
//! font, colour or matrix metadata gets no [`TextStyle`] at all.

use crate::config::ColorFormat;
use crate::model::{Alignment, FontWeight, TextStyle};
use crate::pipeline::color;
use crate::pipeline::extract::RawBlock;
use std::collections::BTreeSet;
use std::fmt::Write as _;

/// Line height used when the PDF gives none.
pub const DEFAULT_LINE_HEIGHT: f32 = 1.2;

/// x offset (points) below which a block is left-aligned.
pub const LEFT_ALIGN_MAX_X: f32 = 100.0;

/// x offset (points) above which a block is right-aligned.
pub const RIGHT_ALIGN_MIN_X: f32 = 400.0;

/// Fonts every browser already has; no `@font-face` is generated for them.
pub const STANDARD_FONTS: [&str; 4] = ["Helvetica", "Arial", "Times", "Times-Roman"];

/// Alignment guessed from the horizontal text offset in points.
pub fn alignment_for_x(x: f32) -> Alignment {
    if x < LEFT_ALIGN_MAX_X {
        Alignment::Left
    } else if x > RIGHT_ALIGN_MIN_X {
        Alignment::Right
    } else {
        Alignment::Center
    }
}

/// Drop the six-letter subset tag pdf producers put in front of embedded
/// font names (`ABCDEF+Garamond` → `Garamond`).
pub fn clean_font_name(name: &str) -> &str {
    match name.split_once('+') {
        Some((tag, rest))
            if tag.len() == 6 && tag.chars().all(|c| c.is_ascii_uppercase()) && !rest.is_empty() =>
        {
            rest
        }
        _ => name,
    }
}

/// Style of one extracted block.
pub fn block_style(block: &RawBlock) -> Option<TextStyle> {
    if block.font.is_none() && block.color.is_none() && block.matrix.is_none() {
        return None;
    }

    let font = block.font.as_ref();
    let weight = font.and_then(|f| {
        if f.is_bold() {
            Some(FontWeight::Bold)
        } else {
            f.weight.map(|_| FontWeight::Normal)
        }
    });

    Some(TextStyle {
        font_family: font
            .and_then(|f| f.name.as_deref())
            .map(|n| clean_font_name(n).to_string()),
        font_size: font.and_then(|f| f.size),
        weight,
        italic: font.is_some_and(|f| f.italic),
        color: block.color.clone(),
        alignment: block.matrix.map(|m| alignment_for_x(m.e)),
        line_height: DEFAULT_LINE_HEIGHT,
    })
}

/// Inline CSS declarations for a block style.
pub fn inline_css(style: &TextStyle, format: ColorFormat) -> String {
    let mut css = String::new();
    if let Some(ref family) = style.font_family {
        let _ = write!(css, "font-family: \"{}\", sans-serif; ", css_string(family));
    }
    if let Some(size) = style.font_size {
        let _ = write!(css, "font-size: {}pt; ", round2(size));
    }
    if let Some(weight) = style.weight {
        let w = match weight {
            FontWeight::Bold => "bold",
            FontWeight::Normal => "normal",
        };
        let _ = write!(css, "font-weight: {}; ", w);
    }
    if style.italic {
        css.push_str("font-style: italic; ");
    }
    let _ = write!(
        css,
        "color: {}; ",
        color::css_color(style.color.as_ref(), format)
    );
    if let Some(alignment) = style.alignment {
        let _ = write!(css, "text-align: {}; ", alignment.as_css());
    }
    let _ = write!(css, "line-height: {};", style.line_height);
    css
}

/// `@font-face` rules for the non-standard fonts in `fonts`, deduplicated
/// and sorted.
pub fn font_faces<'a, I>(fonts: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let names: BTreeSet<&str> = fonts
        .into_iter()
        .map(clean_font_name)
        .filter(|n| !n.trim().is_empty() && !STANDARD_FONTS.contains(n))
        .collect();

    let mut css = String::new();
    for name in names {
        let name = css_string(name);
        let _ = writeln!(
            css,
            "@font-face {{ font-family: \"{name}\"; src: local(\"{name}\"); }}"
        );
    }
    css
}

/// Make `s` safe inside a double-quoted CSS string within a `<style>` element.
fn css_string(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, '"' | '\\' | '<' | '>' | '\n' | '\r'))
        .collect()
}

fn round2(v: f32) -> f32 {
    (v * 100.0).round() / 100.0
}
