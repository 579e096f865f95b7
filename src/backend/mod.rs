//! Collaborator boundary: the PDF parser and the page rasteriser.
//!
//! The conversion core never talks to pdfium directly. It consumes two traits,
//! [`PdfParser`] and [`PageRasterizer`], and the owned data they return
//! ([`ParsedDocument`], [`ParsedPage`], [`TextRun`]). [`pdfium::PdfiumBackend`]
//! implements both over `pdfium-render`; tests plug in hand-built fakes.
//!
//! ```text
//! PdfParser::parse ──▶ ParsedDocument { metadata, pages: [Result<ParsedPage>] }
//!                                           │
//!                              TextSource::{text, runs}
//!
//! PageRasterizer::rasterize ──▶ DynamicImage
//! PageRasterizer::embedded_images ──▶ [EmbeddedImage { image, bounds }]
//! ```

pub mod pdfium;

use crate::config::PageSelection;
use crate::error::{PageError, Pdf2HtmlError};
use crate::output::DocumentMetadata;
use crate::pipeline::color::PdfColor;
use image::DynamicImage;
use std::path::Path;

pub use self::pdfium::PdfiumBackend;

/// The PDF to open, plus the password for encrypted documents.
#[derive(Debug, Clone, Copy)]
pub struct PdfSource<'a> {
    pub path: &'a Path,
    pub password: Option<&'a str>,
}

impl<'a> PdfSource<'a> {
    pub fn new(path: &'a Path) -> Self {
        Self {
            path,
            password: None,
        }
    }

    pub fn with_password(mut self, password: Option<&'a str>) -> Self {
        self.password = password;
        self
    }
}

/// PDF text matrix `[a b c d e f]`; `e`/`f` are the translation in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMatrix {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl TextMatrix {
    /// Identity scale with the given translation.
    pub fn translation(x: f32, y: f32) -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: x,
            f: y,
        }
    }
}

/// Font metadata attached to a text run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FontInfo {
    pub name: Option<String>,
    /// Effective (scaled) font size in points.
    pub size: Option<f32>,
    /// CSS-style numeric weight (400 normal, 700 bold).
    pub weight: Option<u16>,
    pub italic: bool,
}

impl FontInfo {
    /// Bold when the weight is ≥ 600, or the font name says so.
    pub fn is_bold(&self) -> bool {
        self.weight.is_some_and(|w| w >= 600)
            || self
                .name
                .as_deref()
                .is_some_and(|n| n.to_ascii_lowercase().contains("bold"))
    }
}

/// A fragment of text as the parser reports it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextRun {
    pub text: String,
    pub font: Option<FontInfo>,
    pub color: Option<PdfColor>,
    /// Position of the run's top-left corner in PDF user space.
    pub matrix: Option<TextMatrix>,
}

impl TextRun {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// True when the run carries anything beyond its text.
    pub fn has_metadata(&self) -> bool {
        self.font.is_some() || self.color.is_some() || self.matrix.is_some()
    }
}

/// Media-box dimensions in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width_pt: f32,
    pub height_pt: f32,
}

/// Axis-aligned rectangle in PDF user space (bottom-up y).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PdfRect {
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
    pub top: f32,
}

impl PdfRect {
    pub fn width(&self) -> f32 {
        (self.right - self.left).abs()
    }

    pub fn height(&self) -> f32 {
        (self.top - self.bottom).abs()
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }
}

/// Anything that can hand out page text, either whole or as runs.
pub trait TextSource {
    /// Ordered runs in reading order as given by the parser.
    fn runs(&self) -> &[TextRun];

    /// The page text as one string. Defaults to the runs joined by newlines.
    fn text(&self) -> String {
        self.runs()
            .iter()
            .map(|r| r.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// One page as returned by the parser.
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// 1-indexed page number.
    pub number: usize,
    pub size: Option<PageSize>,
    pub runs: Vec<TextRun>,
    /// Whole-page text, when the parser provides it separately from runs.
    pub text: Option<String>,
    /// Font names used on the page.
    pub fonts: Vec<String>,
}

impl ParsedPage {
    /// 0-indexed page position, as the rasteriser expects it.
    pub fn index(&self) -> usize {
        self.number.saturating_sub(1)
    }
}

impl TextSource for ParsedPage {
    fn runs(&self) -> &[TextRun] {
        &self.runs
    }

    fn text(&self) -> String {
        match &self.text {
            Some(t) => t.clone(),
            None => self
                .runs
                .iter()
                .map(|r| r.text.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// The parsed document: metadata plus the selected pages in order.
///
/// A page whose extraction failed is kept as `Err` so the orchestrator can
/// render a placeholder for it.
#[derive(Debug, Default)]
pub struct ParsedDocument {
    pub metadata: DocumentMetadata,
    pub pages: Vec<Result<ParsedPage, PageError>>,
}

/// An image object found on a page, with its placement.
#[derive(Debug, Clone)]
pub struct EmbeddedImage {
    pub image: DynamicImage,
    pub bounds: PdfRect,
}

/// Opens a PDF and extracts per-page text.
pub trait PdfParser: Send + Sync {
    /// Parse the document, returning only the pages in `selection`.
    ///
    /// Failing to open the document is fatal; failing on one page is
    /// reported in that page's slot.
    fn parse(
        &self,
        source: &PdfSource<'_>,
        selection: &PageSelection,
    ) -> Result<ParsedDocument, Pdf2HtmlError>;

    /// Document metadata without page text.
    fn metadata(&self, source: &PdfSource<'_>) -> Result<DocumentMetadata, Pdf2HtmlError> {
        Ok(self.parse(source, &PageSelection::Set(Vec::new()))?.metadata)
    }
}

/// Renders pages (and pulls embedded images) as bitmaps.
pub trait PageRasterizer: Send + Sync {
    /// Rasterise the 0-indexed page at `dpi`.
    fn rasterize(
        &self,
        source: &PdfSource<'_>,
        page_index: usize,
        dpi: u32,
    ) -> Result<DynamicImage, PageError>;

    /// Image objects drawn on the 0-indexed page.
    fn embedded_images(
        &self,
        source: &PdfSource<'_>,
        page_index: usize,
    ) -> Result<Vec<EmbeddedImage>, PageError> {
        let _ = (source, page_index);
        Ok(Vec::new())
    }
}
