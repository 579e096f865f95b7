//! [`PdfParser`] and [`PageRasterizer`] over `pdfium-render`.
//!
//! pdfium is bound afresh for every call and the document is reopened, so the
//! backend itself holds no pdfium handles and is trivially `Send + Sync`.
//! All calls block; async callers go through `spawn_blocking`.
//!
//! ## Why cap pixels as well as DPI?
//!
//! Page sizes vary wildly: an A0 poster at 300 DPI would produce a
//! 14,000 × 19,800 px bitmap. [`MAX_RENDER_EDGE`] caps the longest edge
//! regardless of physical size, keeping memory bounded.

use super::{
    EmbeddedImage, FontInfo, PageRasterizer, PageSize, ParsedDocument, ParsedPage, PdfParser,
    PdfRect, PdfSource, TextMatrix, TextRun,
};
use crate::config::PageSelection;
use crate::error::{PageError, Pdf2HtmlError};
use crate::output::DocumentMetadata;
use crate::pipeline::color;
use image::DynamicImage;
use pdfium_render::prelude::{
    PdfDocument, PdfDocumentMetadataTagType, PdfFontWeight, PdfPage, PdfPageObjectCommon,
    PdfPageObjectsCommon, PdfPageTextSegment, PdfRenderConfig, Pdfium,
};
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Longest rendered edge in pixels.
pub const MAX_RENDER_EDGE: i32 = 8000;

/// Environment variable naming an explicit pdfium library file.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// pdfium-backed parser and rasteriser.
#[derive(Debug, Clone, Default)]
pub struct PdfiumBackend {
    library: Option<PathBuf>,
}

impl PdfiumBackend {
    /// Locate pdfium (see [`bind_pdfium`]) and verify it loads.
    pub fn new() -> Result<Self, Pdf2HtmlError> {
        let backend = Self {
            library: std::env::var_os(PDFIUM_LIB_PATH_ENV).map(PathBuf::from),
        };
        backend.bind()?;
        Ok(backend)
    }

    /// Use the pdfium library at `path`.
    pub fn with_library(path: impl Into<PathBuf>) -> Result<Self, Pdf2HtmlError> {
        let backend = Self {
            library: Some(path.into()),
        };
        backend.bind()?;
        Ok(backend)
    }

    fn bind(&self) -> Result<Pdfium, Pdf2HtmlError> {
        bind_pdfium(self.library.as_deref())
    }
}

/// Bind to pdfium: an explicit library path first, then the working
/// directory, then the system library.
pub fn bind_pdfium(library: Option<&std::path::Path>) -> Result<Pdfium, Pdf2HtmlError> {
    if let Some(path) = library {
        return Pdfium::bind_to_library(path)
            .map(Pdfium::new)
            .map_err(|e| {
                Pdf2HtmlError::PdfiumBindingFailed(format!("{} ({e:?})", path.display()))
            });
    }

    Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| Pdfium::bind_to_system_library())
        .map(Pdfium::new)
        .map_err(|e| Pdf2HtmlError::PdfiumBindingFailed(format!("{e:?}")))
}

/// Open the document, mapping pdfium's load errors onto fatal errors.
fn open<'a>(pdfium: &'a Pdfium, source: &PdfSource<'a>) -> Result<PdfDocument<'a>, Pdf2HtmlError> {
    pdfium
        .load_pdf_from_file(source.path, source.password)
        .map_err(|e| {
            let err_str = format!("{:?}", e);
            if err_str.contains("Password") || err_str.contains("password") {
                if source.password.is_some() {
                    Pdf2HtmlError::WrongPassword {
                        path: source.path.to_path_buf(),
                    }
                } else {
                    Pdf2HtmlError::PasswordRequired {
                        path: source.path.to_path_buf(),
                    }
                }
            } else {
                Pdf2HtmlError::CorruptPdf {
                    path: source.path.to_path_buf(),
                    detail: err_str,
                }
            }
        })
}

fn read_metadata(document: &PdfDocument<'_>) -> DocumentMetadata {
    let metadata = document.metadata();

    let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
        metadata.get(tag).and_then(|t| {
            let v = t.value().trim().to_string();
            if v.is_empty() {
                None
            } else {
                Some(v)
            }
        })
    };

    DocumentMetadata {
        title: get_meta(PdfDocumentMetadataTagType::Title),
        author: get_meta(PdfDocumentMetadataTagType::Author),
        subject: get_meta(PdfDocumentMetadataTagType::Subject),
        creator: get_meta(PdfDocumentMetadataTagType::Creator),
        producer: get_meta(PdfDocumentMetadataTagType::Producer),
        creation_date: get_meta(PdfDocumentMetadataTagType::CreationDate),
        modification_date: get_meta(PdfDocumentMetadataTagType::ModificationDate),
        page_count: document.pages().len() as usize,
        pdf_version: format!("{:?}", document.version()),
    }
}

impl PdfParser for PdfiumBackend {
    fn parse(
        &self,
        source: &PdfSource<'_>,
        selection: &PageSelection,
    ) -> Result<ParsedDocument, Pdf2HtmlError> {
        let pdfium = self.bind()?;
        let document = open(&pdfium, source)?;
        let metadata = read_metadata(&document);
        let total_pages = metadata.page_count;
        info!("PDF loaded: {} pages", total_pages);

        let pages = document.pages();
        let mut parsed = Vec::new();
        for idx in selection.to_indices(total_pages) {
            let number = idx + 1;
            let page = pages
                .get(idx as u16)
                .map_err(|e| PageError::ExtractionFailed {
                    page: number,
                    detail: format!("{:?}", e),
                })
                .and_then(|page| parse_page(&page, number));
            if let Err(ref e) = page {
                warn!("{}", e);
            }
            parsed.push(page);
        }

        Ok(ParsedDocument {
            metadata,
            pages: parsed,
        })
    }

    fn metadata(&self, source: &PdfSource<'_>) -> Result<DocumentMetadata, Pdf2HtmlError> {
        let pdfium = self.bind()?;
        let document = open(&pdfium, source)?;
        Ok(read_metadata(&document))
    }
}

fn parse_page(page: &PdfPage<'_>, number: usize) -> Result<ParsedPage, PageError> {
    let text = page.text().map_err(|e| PageError::ExtractionFailed {
        page: number,
        detail: format!("{:?}", e),
    })?;

    let mut runs = Vec::new();
    let mut fonts = BTreeSet::new();
    for segment in text.segments().iter() {
        let content = segment.text();
        if content.trim().is_empty() {
            continue;
        }

        let bounds = segment.bounds();
        let (font, fill) = segment_style(&segment);
        if let Some(name) = font.as_ref().and_then(|f| f.name.clone()) {
            fonts.insert(name);
        }

        runs.push(TextRun {
            text: content,
            font,
            color: fill,
            matrix: Some(TextMatrix::translation(
                bounds.left().value,
                bounds.top().value,
            )),
        });
    }

    debug!("Page {}: {} text runs", number, runs.len());
    Ok(ParsedPage {
        number,
        size: Some(PageSize {
            width_pt: page.width().value,
            height_pt: page.height().value,
        }),
        runs,
        text: None,
        fonts: fonts.into_iter().collect(),
    })
}

/// Font and fill colour of a segment, read from its first character.
fn segment_style(segment: &PdfPageTextSegment<'_>) -> (Option<FontInfo>, Option<color::PdfColor>) {
    let Ok(chars) = segment.chars() else {
        return (None, None);
    };
    let Some(first) = chars.iter().next() else {
        return (None, None);
    };

    let size = first.scaled_font_size().value;
    let name = first.font_name();
    let weight = match first.font_weight() {
        Some(PdfFontWeight::Weight100) => Some(100),
        Some(PdfFontWeight::Weight200) => Some(200),
        Some(PdfFontWeight::Weight300) => Some(300),
        Some(PdfFontWeight::Weight400Normal) => Some(400),
        Some(PdfFontWeight::Weight500) => Some(500),
        Some(PdfFontWeight::Weight600) => Some(600),
        Some(PdfFontWeight::Weight700Bold) => Some(700),
        Some(PdfFontWeight::Weight800) => Some(800),
        Some(PdfFontWeight::Weight900) => Some(900),
        Some(PdfFontWeight::Custom(w)) => Some(w.min(1000) as u16),
        None => None,
    };
    let weight = if first.font_is_bold_reenforced() {
        Some(weight.unwrap_or(700).max(700))
    } else {
        weight
    };

    let font = FontInfo {
        name: (!name.is_empty()).then_some(name),
        size: (size.is_finite() && size > 0.0).then_some(size),
        weight,
        italic: first.font_is_italic(),
    };
    let fill = first
        .fill_color()
        .ok()
        .map(|c| color::PdfColor::Rgb8([c.red(), c.green(), c.blue()]));

    (Some(font), fill)
}

impl PageRasterizer for PdfiumBackend {
    fn rasterize(
        &self,
        source: &PdfSource<'_>,
        page_index: usize,
        dpi: u32,
    ) -> Result<DynamicImage, PageError> {
        let number = page_index + 1;
        let fail = |detail: String| PageError::ImageFailed {
            page: number,
            detail,
        };

        let pdfium = self.bind().map_err(|e| fail(e.to_string()))?;
        let document = open(&pdfium, source).map_err(|e| fail(e.to_string()))?;
        let page = document
            .pages()
            .get(page_index as u16)
            .map_err(|e| fail(format!("{:?}", e)))?;

        let render_config = PdfRenderConfig::new()
            .scale_page_by_factor(dpi as f32 / 72.0)
            .set_maximum_width(MAX_RENDER_EDGE)
            .set_maximum_height(MAX_RENDER_EDGE);

        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| fail(format!("{:?}", e)))?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px",
            number,
            image.width(),
            image.height()
        );
        Ok(image)
    }

    fn embedded_images(
        &self,
        source: &PdfSource<'_>,
        page_index: usize,
    ) -> Result<Vec<EmbeddedImage>, PageError> {
        let number = page_index + 1;
        let fail = |detail: String| PageError::ImageFailed {
            page: number,
            detail,
        };

        let pdfium = self.bind().map_err(|e| fail(e.to_string()))?;
        let document = open(&pdfium, source).map_err(|e| fail(e.to_string()))?;
        let page = document
            .pages()
            .get(page_index as u16)
            .map_err(|e| fail(format!("{:?}", e)))?;

        let mut images = Vec::new();
        for object in page.objects().iter() {
            let Some(image_object) = object.as_image_object() else {
                continue;
            };
            let image = match image_object.get_raw_image() {
                Ok(image) => image,
                Err(e) => {
                    warn!("Page {}: unreadable image object: {:?}", number, e);
                    continue;
                }
            };
            let Ok(quad) = object.bounds() else {
                continue;
            };
            let rect = quad.to_rect();
            images.push(EmbeddedImage {
                image,
                bounds: PdfRect {
                    left: rect.left().value,
                    bottom: rect.bottom().value,
                    right: rect.right().value,
                    top: rect.top().value,
                },
            });
        }

        debug!("Page {}: {} embedded images", number, images.len());
        Ok(images)
    }
}
