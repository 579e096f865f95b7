//! Converted-document model: pages, classified blocks and image references.
//!
//! Everything here is transient: built once per `convert` call, handed to the
//! assembler, then dropped. Text is stored raw and escaped only when the
//! assembler renders it.

use crate::pipeline::color::PdfColor;
use serde::Serialize;
use std::path::PathBuf;

/// Structural role of a text block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Heading,
    Paragraph,
}

/// Horizontal alignment guessed from a block's x offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    Left,
    Center,
    Right,
}

impl Alignment {
    pub fn as_css(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
        }
    }
}

/// CSS font weight derived from the PDF font.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FontWeight {
    Normal,
    Bold,
}

/// Typography attached to a block when the parser exposes font details.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextStyle {
    pub font_family: Option<String>,
    /// Font size in points.
    pub font_size: Option<f32>,
    pub weight: Option<FontWeight>,
    pub italic: bool,
    pub color: Option<PdfColor>,
    pub alignment: Option<Alignment>,
    pub line_height: f32,
}

impl TextStyle {
    /// True when size or weight is known, which switches the classifier
    /// into its style-aware rule.
    pub fn has_font_metrics(&self) -> bool {
        self.font_size.is_some() || self.weight.is_some()
    }

    pub fn is_bold(&self) -> bool {
        self.weight == Some(FontWeight::Bold)
    }
}

/// Top-left corner in CSS pixels, relative to the page container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

/// Width/height in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

/// A classified run of text ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    pub kind: BlockKind,
    pub text: String,
    pub style: Option<TextStyle>,
    pub position: Option<Position>,
}

impl Block {
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self {
            kind: BlockKind::Paragraph,
            text: text.into(),
            style: None,
            position: None,
        }
    }

    pub fn is_heading(&self) -> bool {
        self.kind == BlockKind::Heading
    }
}

/// A persisted (or inlined) image and where to show it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageRef {
    /// Value for the `src` attribute: a public URL or a `data:` URI.
    pub src: String,
    pub alt: String,
    /// Where the file was written; `None` for inlined images.
    pub path: Option<PathBuf>,
    pub position: Option<Position>,
    pub size: Option<Size>,
    pub pixel_width: u32,
    pub pixel_height: u32,
    /// Encoded size in bytes.
    pub bytes: usize,
}

/// One converted page.
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    /// 1-indexed page number.
    pub number: usize,
    pub width_px: f32,
    pub height_px: f32,
    pub blocks: Vec<Block>,
    pub images: Vec<ImageRef>,
}

impl Page {
    /// Whether any block or image carries an absolute position.
    pub fn is_positioned(&self) -> bool {
        self.blocks.iter().any(|b| b.position.is_some())
            || self.images.iter().any(|i| i.position.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_metrics_detection() {
        let mut style = TextStyle {
            font_family: Some("Helvetica".into()),
            font_size: None,
            weight: None,
            italic: false,
            color: None,
            alignment: None,
            line_height: 1.2,
        };
        assert!(!style.has_font_metrics());
        style.weight = Some(FontWeight::Bold);
        assert!(style.has_font_metrics());
        assert!(style.is_bold());
    }

    #[test]
    fn page_positioned_only_with_positions() {
        let mut page = Page {
            number: 1,
            width_px: 793.0,
            height_px: 1122.0,
            blocks: vec![Block::paragraph("a")],
            images: vec![],
        };
        assert!(!page.is_positioned());
        page.blocks[0].position = Some(Position { x: 0.0, y: 24.0 });
        assert!(page.is_positioned());
    }
}
