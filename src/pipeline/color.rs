//! PDF colour → CSS colour string.

use crate::config::ColorFormat;
use serde::Serialize;

/// CSS value used when a block has no colour.
pub const DEFAULT_COLOR: &str = "#000000";

/// A colour as the parser reports it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PdfColor {
    /// RGB channels in `[0, 1]`; out-of-range values are clamped.
    Normalized([f32; 3]),
    /// 8-bit RGB channels.
    Rgb8([u8; 3]),
    /// Already a CSS colour; passed through untouched.
    Css(String),
}

impl PdfColor {
    /// 8-bit channels, or `None` for pass-through CSS strings.
    pub fn channels(&self) -> Option<[u8; 3]> {
        match self {
            PdfColor::Normalized(rgb) => Some(rgb.map(to_channel)),
            PdfColor::Rgb8(rgb) => Some(*rgb),
            PdfColor::Css(_) => None,
        }
    }

    pub fn to_css(&self, format: ColorFormat) -> String {
        if let PdfColor::Css(css) = self {
            return css.clone();
        }
        let [r, g, b] = self.channels().unwrap_or([0, 0, 0]);
        match format {
            ColorFormat::Rgb => format!("rgb({},{},{})", r, g, b),
            ColorFormat::Hex => format!("#{:02x}{:02x}{:02x}", r, g, b),
        }
    }
}

/// Clamp to `[0, 1]` and truncate onto `0..=255`. NaN maps to 0.
fn to_channel(c: f32) -> u8 {
    if c.is_nan() {
        return 0;
    }
    (c.clamp(0.0, 1.0) * 255.0) as u8
}

/// CSS colour for an optional PDF colour; black when absent.
pub fn css_color(color: Option<&PdfColor>, format: ColorFormat) -> String {
    match color {
        Some(c) => c.to_css(format),
        None => DEFAULT_COLOR.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_truncates() {
        let c = PdfColor::Normalized([0.5, 0.0, 1.0]);
        assert_eq!(c.to_css(ColorFormat::Rgb), "rgb(127,0,255)");
        assert_eq!(c.to_css(ColorFormat::Hex), "#7f00ff");
    }

    #[test]
    fn out_of_range_is_clamped() {
        let c = PdfColor::Normalized([-0.3, 1.7, f32::NAN]);
        assert_eq!(c.to_css(ColorFormat::Rgb), "rgb(0,255,0)");
    }

    #[test]
    fn rgb8_and_css_pass_through() {
        assert_eq!(
            PdfColor::Rgb8([12, 34, 56]).to_css(ColorFormat::Rgb),
            "rgb(12,34,56)"
        );
        assert_eq!(
            PdfColor::Css("red".into()).to_css(ColorFormat::Hex),
            "red"
        );
    }

    #[test]
    fn absent_is_black() {
        assert_eq!(css_color(None, ColorFormat::Rgb), "#000000");
    }

    #[test]
    fn deterministic() {
        let c = PdfColor::Normalized([0.2, 0.4, 0.6]);
        assert_eq!(c.to_css(ColorFormat::Rgb), c.to_css(ColorFormat::Rgb));
        assert_eq!(c.to_css(ColorFormat::Rgb), "rgb(51,102,153)");
    }
}
