//! Configuration types for PDF-to-HTML conversion.
//!
//! All conversion behaviour is controlled through [`ConversionOptions`], built
//! via its [`ConversionOptionsBuilder`] or deserialised from JSON. Options are
//! passed explicitly into every `convert` call; there is no process-wide
//! configuration.
//!
//! Every field is independently defaultable: a JSON document only needs the
//! keys it wants to change, and keys the crate does not know are ignored.

use crate::backend::PageSize;
use crate::error::Pdf2HtmlError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// A4 media box in points.
pub const A4_SIZE: PageSize = PageSize {
    width_pt: 595.0,
    height_pt: 842.0,
};

const POINTS_PER_MM: f32 = 72.0 / 25.4;

/// Options for a PDF-to-HTML conversion.
///
/// Built via [`ConversionOptions::builder()`], [`ConversionOptions::from_json`]
/// or [`ConversionOptions::default()`].
///
/// # Example
/// ```rust
/// use edgequake_pdf2html::ConversionOptions;
///
/// let options = ConversionOptions::builder()
///     .dpi(150)
///     .image_quality(90)
///     .public_url_prefix("/static/pdf-images")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionOptions {
    /// Write page images next to the HTML. Default: true.
    pub extract_images: bool,

    /// Encoder quality, 1–100. Default: 80.
    ///
    /// JPEG passes it straight to the encoder. PNG is lossless, so quality
    /// selects compression effort instead: higher quality spends less time
    /// compressing and never produces a smaller file.
    pub image_quality: u8,

    /// Encoding for written images. Default: PNG.
    pub image_format: ImageFormat,

    /// Whether to rasterise whole pages or pull embedded image objects.
    /// Default: [`ImageMode::PageRaster`].
    pub image_mode: ImageMode,

    /// Inline images as base64 `data:` URIs instead of writing files. Default: false.
    pub embed_images: bool,

    /// Rasterisation DPI. Range: 72–600. Default: 300.
    pub dpi: u32,

    /// Attach font, colour and alignment to blocks. Default: true.
    ///
    /// Only controls what is emitted: the heading classifier uses font size
    /// and weight whenever the parser reports them.
    pub preserve_styles: bool,

    /// Place blocks and images with absolute CSS positioning. Default: false.
    pub preserve_layout: bool,

    /// Keep single line breaks inside paragraphs as `<br>`. Default: false.
    pub preserve_line_breaks: bool,

    /// Fallback page width when the PDF has no usable media box.
    pub page_width_mm: Option<f32>,

    /// Fallback page height when the PDF has no usable media box.
    pub page_height_mm: Option<f32>,

    /// Directory image files are written to. Default: `storage/app/public/pdf-images`.
    pub image_dir: PathBuf,

    /// URL prefix the image directory is served under. Default: `/storage/pdf-images`.
    pub public_url_prefix: String,

    /// Emit `@media` rules for the breakpoints and print. Default: true.
    pub responsive: bool,

    /// CSS colour notation. Default: [`ColorFormat::Rgb`].
    pub color_format: ColorFormat,

    /// Class names used in the generated markup.
    pub css_classes: CssClasses,

    /// Responsive breakpoints in pixels.
    pub breakpoints: Breakpoints,

    /// Document `<title>`. If None, uses the PDF title or the file name.
    pub title: Option<String>,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Page selection. Default: All pages.
    pub pages: PageSelection,

    /// Optional per-page progress events.
    #[serde(skip)]
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            extract_images: true,
            image_quality: 80,
            image_format: ImageFormat::default(),
            image_mode: ImageMode::default(),
            embed_images: false,
            dpi: 300,
            preserve_styles: true,
            preserve_layout: false,
            preserve_line_breaks: false,
            page_width_mm: None,
            page_height_mm: None,
            image_dir: PathBuf::from("storage/app/public/pdf-images"),
            public_url_prefix: "/storage/pdf-images".to_string(),
            responsive: true,
            color_format: ColorFormat::default(),
            css_classes: CssClasses::default(),
            breakpoints: Breakpoints::default(),
            title: None,
            password: None,
            pages: PageSelection::default(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionOptions")
            .field("extract_images", &self.extract_images)
            .field("image_quality", &self.image_quality)
            .field("image_format", &self.image_format)
            .field("image_mode", &self.image_mode)
            .field("embed_images", &self.embed_images)
            .field("dpi", &self.dpi)
            .field("preserve_styles", &self.preserve_styles)
            .field("preserve_layout", &self.preserve_layout)
            .field("image_dir", &self.image_dir)
            .field("public_url_prefix", &self.public_url_prefix)
            .field("responsive", &self.responsive)
            .field("pages", &self.pages)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionOptions {
    /// Create a new builder for `ConversionOptions`.
    pub fn builder() -> ConversionOptionsBuilder {
        ConversionOptionsBuilder {
            options: Self::default(),
        }
    }

    /// Parse options from JSON. Missing keys take their defaults and
    /// unknown keys are ignored.
    pub fn from_json(json: &str) -> Result<Self, Pdf2HtmlError> {
        let options: Self = serde_json::from_str(json)
            .map_err(|e| Pdf2HtmlError::InvalidConfig(format!("options JSON: {e}")))?;
        options.validate()?;
        Ok(options)
    }

    /// Load options from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, Pdf2HtmlError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            Pdf2HtmlError::InvalidConfig(format!("cannot read '{}': {e}", path.display()))
        })?;
        Self::from_json(&json)
    }

    /// Page size used when a page has no usable media box.
    pub fn fallback_page_size(&self) -> PageSize {
        PageSize {
            width_pt: self
                .page_width_mm
                .filter(|mm| mm.is_finite() && *mm > 0.0)
                .map_or(A4_SIZE.width_pt, |mm| mm * POINTS_PER_MM),
            height_pt: self
                .page_height_mm
                .filter(|mm| mm.is_finite() && *mm > 0.0)
                .map_or(A4_SIZE.height_pt, |mm| mm * POINTS_PER_MM),
        }
    }

    /// Whether images end up as files in [`Self::image_dir`].
    pub fn writes_image_files(&self) -> bool {
        self.extract_images && !self.embed_images
    }

    /// Check every constraint the builder enforces.
    pub fn validate(&self) -> Result<(), Pdf2HtmlError> {
        if !(1..=100).contains(&self.image_quality) {
            return Err(Pdf2HtmlError::InvalidConfig(format!(
                "image_quality must be 1–100, got {}",
                self.image_quality
            )));
        }
        if self.dpi < 72 || self.dpi > 600 {
            return Err(Pdf2HtmlError::InvalidConfig(format!(
                "DPI must be 72–600, got {}",
                self.dpi
            )));
        }
        let bp = &self.breakpoints;
        if !(bp.mobile < bp.tablet && bp.tablet < bp.desktop) {
            return Err(Pdf2HtmlError::InvalidConfig(format!(
                "breakpoints must ascend (mobile < tablet < desktop), got {}/{}/{}",
                bp.mobile, bp.tablet, bp.desktop
            )));
        }
        let c = &self.css_classes;
        for class in [&c.container, &c.page, &c.content, &c.paragraph, &c.heading, &c.image] {
            if !is_css_identifier(class) {
                return Err(Pdf2HtmlError::InvalidConfig(format!(
                    "'{class}' is not a valid CSS class name"
                )));
            }
        }
        if self.public_url_prefix.trim().is_empty() {
            return Err(Pdf2HtmlError::InvalidConfig(
                "public_url_prefix must not be empty".into(),
            ));
        }
        Ok(())
    }
}

fn is_css_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '-')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Builder for [`ConversionOptions`].
#[derive(Debug)]
pub struct ConversionOptionsBuilder {
    options: ConversionOptions,
}

impl ConversionOptionsBuilder {
    pub fn extract_images(mut self, v: bool) -> Self {
        self.options.extract_images = v;
        self
    }

    pub fn image_quality(mut self, quality: u8) -> Self {
        self.options.image_quality = quality.clamp(1, 100);
        self
    }

    pub fn image_format(mut self, format: ImageFormat) -> Self {
        self.options.image_format = format;
        self
    }

    pub fn image_mode(mut self, mode: ImageMode) -> Self {
        self.options.image_mode = mode;
        self
    }

    pub fn embed_images(mut self, v: bool) -> Self {
        self.options.embed_images = v;
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.options.dpi = dpi.clamp(72, 600);
        self
    }

    pub fn preserve_styles(mut self, v: bool) -> Self {
        self.options.preserve_styles = v;
        self
    }

    pub fn preserve_layout(mut self, v: bool) -> Self {
        self.options.preserve_layout = v;
        self
    }

    pub fn preserve_line_breaks(mut self, v: bool) -> Self {
        self.options.preserve_line_breaks = v;
        self
    }

    pub fn page_size_mm(mut self, width: f32, height: f32) -> Self {
        self.options.page_width_mm = Some(width);
        self.options.page_height_mm = Some(height);
        self
    }

    pub fn image_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.options.image_dir = dir.into();
        self
    }

    pub fn public_url_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.options.public_url_prefix = prefix.into();
        self
    }

    pub fn responsive(mut self, v: bool) -> Self {
        self.options.responsive = v;
        self
    }

    pub fn color_format(mut self, format: ColorFormat) -> Self {
        self.options.color_format = format;
        self
    }

    pub fn css_classes(mut self, classes: CssClasses) -> Self {
        self.options.css_classes = classes;
        self
    }

    pub fn breakpoints(mut self, breakpoints: Breakpoints) -> Self {
        self.options.breakpoints = breakpoints;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.options.title = Some(title.into());
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.options.password = Some(pwd.into());
        self
    }

    pub fn pages(mut self, selection: PageSelection) -> Self {
        self.options.pages = selection;
        self
    }

    pub fn progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.options.progress_callback = Some(callback);
        self
    }

    /// Build the options, validating constraints.
    pub fn build(self) -> Result<ConversionOptions, Pdf2HtmlError> {
        self.options.validate()?;
        Ok(self.options)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// File format for written images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageFormat {
    #[default]
    Png,
    Jpeg,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
        }
    }
}

/// How page images are obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageMode {
    /// Render each page to one bitmap. (default)
    #[default]
    PageRaster,
    /// Pull the image objects drawn on each page, skipping full-page backgrounds.
    Embedded,
}

/// CSS colour notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorFormat {
    /// `rgb(r,g,b)` (default)
    #[default]
    Rgb,
    /// `#rrggbb`
    Hex,
}

/// Class names used in the generated markup and stylesheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CssClasses {
    pub container: String,
    pub page: String,
    pub content: String,
    pub paragraph: String,
    pub heading: String,
    pub image: String,
}

impl Default for CssClasses {
    fn default() -> Self {
        Self {
            container: "pdf-container".into(),
            page: "pdf-page".into(),
            content: "pdf-content".into(),
            paragraph: "pdf-paragraph".into(),
            heading: "pdf-heading".into(),
            image: "pdf-image".into(),
        }
    }
}

/// Responsive breakpoints in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Breakpoints {
    pub mobile: u32,
    pub tablet: u32,
    pub desktop: u32,
}

impl Default for Breakpoints {
    fn default() -> Self {
        Self {
            mobile: 480,
            tablet: 768,
            desktop: 1024,
        }
    }
}

/// Specifies which pages of the PDF to convert.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub enum PageSelection {
    /// Convert all pages (default).
    #[default]
    All,
    /// Convert a single page (1-indexed).
    Single(usize),
    /// Convert a contiguous range of pages (1-indexed, inclusive).
    Range(usize, usize),
    /// Convert specific pages (1-indexed, deduplicated).
    Set(Vec<usize>),
}

impl PageSelection {
    /// Expand the selection into a sorted, deduplicated list of 0-indexed page numbers.
    pub fn to_indices(&self, total_pages: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = match self {
            PageSelection::All => (0..total_pages).collect(),
            PageSelection::Single(p) => {
                if *p >= 1 && *p <= total_pages {
                    vec![p - 1]
                } else {
                    vec![]
                }
            }
            PageSelection::Range(start, end) => {
                let s = (*start).max(1) - 1;
                let e = (*end).min(total_pages);
                (s..e).collect()
            }
            PageSelection::Set(pages) => pages
                .iter()
                .filter(|&&p| p >= 1 && p <= total_pages)
                .map(|p| p - 1)
                .collect(),
        };
        indices.sort_unstable();
        indices.dedup();
        indices
    }
}
