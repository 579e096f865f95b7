//! Conversion entry points and the page orchestrator.
//!
//! [`PdfToHtmlConverter`] drives the pipeline over a [`PdfParser`] and a
//! [`PageRasterizer`]. The free functions ([`convert`], [`convert_async`], …)
//! build one over pdfium for callers that don't need to swap the backend.
//!
//! Conversion is synchronous and strictly ordered: pages in document order,
//! blocks in extraction order. [`convert_async`] runs the same code on
//! tokio's blocking pool because pdfium calls block.

use crate::backend::{PageRasterizer, PdfParser, PdfSource, PdfiumBackend};
use crate::config::ConversionOptions;
use crate::error::Pdf2HtmlError;
use crate::model::{Block, Page};
use crate::output::{ConversionStats, DocumentMetadata, HtmlDocument, PageResult};
use crate::pipeline::assemble::HtmlAssembler;
use crate::pipeline::css::StyleSheet;
use crate::pipeline::images::ImageExtractor;
use crate::pipeline::{classify, extract, geometry, input, style};
use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// PDF-to-HTML converter over pluggable parser and rasteriser backends.
#[derive(Clone)]
pub struct PdfToHtmlConverter {
    parser: Arc<dyn PdfParser>,
    rasterizer: Arc<dyn PageRasterizer>,
}

impl PdfToHtmlConverter {
    pub fn new(parser: Arc<dyn PdfParser>, rasterizer: Arc<dyn PageRasterizer>) -> Self {
        Self { parser, rasterizer }
    }

    /// A converter backed by pdfium for both parsing and rasterising.
    pub fn with_pdfium() -> Result<Self, Pdf2HtmlError> {
        let backend = Arc::new(PdfiumBackend::new()?);
        Ok(Self::new(backend.clone(), backend))
    }

    /// Convert the PDF at `path` to HTML.
    ///
    /// # Errors
    /// Returns `Err(Pdf2HtmlError)` only for fatal errors: missing or
    /// unreadable input, a file that is not a PDF or cannot be opened, an
    /// image directory that cannot be created, or a page selection that
    /// matches no page. Failed pages and images are reported in
    /// [`HtmlDocument::pages`] instead.
    pub fn convert(
        &self,
        path: impl AsRef<Path>,
        options: &ConversionOptions,
    ) -> Result<HtmlDocument, Pdf2HtmlError> {
        let path = input::validate_pdf(path.as_ref())?;
        let fallback_title = input::title_from_path(&path);
        self.convert_validated(&path, options, &fallback_title)
    }

    /// Run [`Self::convert`] on tokio's blocking pool.
    pub async fn convert_async(
        &self,
        path: impl AsRef<Path>,
        options: &ConversionOptions,
    ) -> Result<HtmlDocument, Pdf2HtmlError> {
        let this = self.clone();
        let path = path.as_ref().to_path_buf();
        let options = options.clone();
        tokio::task::spawn_blocking(move || this.convert(&path, &options))
            .await
            .map_err(|e| Pdf2HtmlError::Internal(format!("Conversion task panicked: {}", e)))?
    }

    /// Convert and write the HTML to `output_path`.
    ///
    /// Uses an atomic write (temp file in the same directory + rename) so a
    /// failed conversion never leaves a partial file behind.
    pub fn convert_to_file(
        &self,
        path: impl AsRef<Path>,
        output_path: impl AsRef<Path>,
        options: &ConversionOptions,
    ) -> Result<ConversionStats, Pdf2HtmlError> {
        let output = self.convert(path, options)?;
        write_atomic(output_path.as_ref(), output.html.as_bytes())?;
        Ok(output.stats)
    }

    /// Convert PDF bytes held in memory.
    ///
    /// The bytes are staged in a managed [`tempfile`] that is removed when
    /// this returns.
    pub fn convert_from_bytes(
        &self,
        bytes: &[u8],
        options: &ConversionOptions,
    ) -> Result<HtmlDocument, Pdf2HtmlError> {
        let mut tmp = tempfile::Builder::new()
            .suffix(".pdf")
            .tempfile()
            .map_err(|e| Pdf2HtmlError::Internal(format!("tempfile: {e}")))?;
        tmp.write_all(bytes)
            .map_err(|e| Pdf2HtmlError::Internal(format!("tempfile write: {e}")))?;
        let path = input::validate_pdf(tmp.path())?;
        self.convert_validated(&path, options, "Document")
    }

    /// Read document metadata without converting anything.
    pub fn inspect(
        &self,
        path: impl AsRef<Path>,
        password: Option<&str>,
    ) -> Result<DocumentMetadata, Pdf2HtmlError> {
        let path = input::validate_pdf(path.as_ref())?;
        let source = PdfSource::new(&path).with_password(password);
        self.parser.metadata(&source)
    }

    fn convert_validated(
        &self,
        path: &Path,
        options: &ConversionOptions,
        fallback_title: &str,
    ) -> Result<HtmlDocument, Pdf2HtmlError> {
        let total_start = Instant::now();
        options.validate()?;
        info!("Starting conversion: {}", path.display());

        // ── Step 1: Ensure image directory ───────────────────────────────
        if options.writes_image_files() {
            std::fs::create_dir_all(&options.image_dir).map_err(|e| {
                Pdf2HtmlError::StorageSetupFailed {
                    path: options.image_dir.clone(),
                    source: e,
                }
            })?;
        }

        // ── Step 2: Parse ────────────────────────────────────────────────
        let source = PdfSource::new(path).with_password(options.password.as_deref());
        let document = self.parser.parse(&source, &options.pages)?;
        let total_pages = document.metadata.page_count;
        if document.pages.is_empty() && total_pages > 0 {
            return Err(Pdf2HtmlError::InvalidConfig(format!(
                "page selection {:?} matches none of the {} pages",
                options.pages, total_pages
            )));
        }
        let selected = document.pages.len();
        info!("PDF has {} pages, converting {}", total_pages, selected);

        if let Some(ref cb) = options.progress_callback {
            cb.on_conversion_start(selected);
        }

        // ── Step 3: Pages ────────────────────────────────────────────────
        let assembler = HtmlAssembler::new(options);
        let images = ImageExtractor::new(self.rasterizer.as_ref(), options);
        let fallback_size = options.fallback_page_size();
        let mut fonts = BTreeSet::new();
        let mut fragments = Vec::with_capacity(selected);
        let mut results = Vec::with_capacity(selected);

        for parsed in document.pages {
            let parsed = match parsed {
                Ok(page) => page,
                Err(e) => {
                    let page_num = e.page();
                    warn!("{}", e);
                    if let Some(ref cb) = options.progress_callback {
                        cb.on_page_error(page_num, selected, &e.to_string());
                    }
                    let fragment = assembler.failed_page_fragment(page_num);
                    results.push(PageResult {
                        page_num,
                        blocks: 0,
                        headings: 0,
                        images: Vec::new(),
                        html_len: fragment.len(),
                        error: Some(e),
                        image_errors: Vec::new(),
                    });
                    fragments.push(fragment);
                    continue;
                }
            };

            let page_num = parsed.number;
            if let Some(ref cb) = options.progress_callback {
                cb.on_page_start(page_num, selected);
            }

            let size = geometry::page_size(parsed.size, fallback_size);
            let page_px = geometry::page_size_px(size);

            let blocks: Vec<Block> = extract::extract_blocks(&parsed, options.preserve_line_breaks)
                .into_iter()
                .enumerate()
                .map(|(i, raw)| {
                    // Font metrics drive classification even when styles are not emitted.
                    let derived = style::block_style(&raw);
                    let kind = classify::classify(&raw.text, derived.as_ref());
                    let position = options
                        .preserve_layout
                        .then(|| geometry::block_position(raw.matrix.as_ref(), size, i));
                    Block {
                        kind,
                        text: raw.text,
                        style: derived.filter(|_| options.preserve_styles),
                        position,
                    }
                })
                .collect();

            if options.preserve_styles {
                fonts.extend(parsed.fonts.iter().cloned());
            }

            let (page_images, image_errors) = if options.extract_images {
                images.extract(&source, page_num, size)
            } else {
                (Vec::new(), Vec::new())
            };

            let page = Page {
                number: page_num,
                width_px: page_px.width,
                height_px: page_px.height,
                blocks,
                images: page_images,
            };
            let fragment = assembler.page_fragment(&page);
            debug!(
                "Page {}: {} blocks, {} images, {} bytes",
                page_num,
                page.blocks.len(),
                page.images.len(),
                fragment.len()
            );
            if let Some(ref cb) = options.progress_callback {
                cb.on_page_complete(page_num, selected, fragment.len());
            }

            results.push(PageResult {
                page_num,
                blocks: page.blocks.len(),
                headings: page.blocks.iter().filter(|b| b.is_heading()).count(),
                images: page.images,
                html_len: fragment.len(),
                error: None,
                image_errors,
            });
            fragments.push(fragment);
        }

        // ── Step 4: Document ─────────────────────────────────────────────
        let font_faces = if options.preserve_styles {
            style::font_faces(fonts.iter().map(String::as_str))
        } else {
            String::new()
        };
        let stylesheet = StyleSheet::new(&options.css_classes, &options.breakpoints, options.responsive)
            .with_font_faces(font_faces);
        let title = options
            .title
            .clone()
            .or_else(|| document.metadata.title.clone())
            .unwrap_or_else(|| fallback_title.to_string());
        let html = assembler.document(&title, &stylesheet, &fragments);

        // ── Step 5: Stats ────────────────────────────────────────────────
        let processed = results.iter().filter(|p| p.is_success()).count();
        let stats = ConversionStats {
            total_pages,
            processed_pages: processed,
            failed_pages: results.len() - processed,
            images_written: results.iter().map(|p| p.images.len()).sum(),
            image_failures: results.iter().map(|p| p.image_errors.len()).sum(),
            total_duration_ms: total_start.elapsed().as_millis() as u64,
        };

        if let Some(ref cb) = options.progress_callback {
            cb.on_conversion_complete(selected, processed);
        }
        info!(
            "Conversion complete: {}/{} pages, {} images, {}ms",
            processed, selected, stats.images_written, stats.total_duration_ms
        );

        Ok(HtmlDocument {
            html,
            pages: results,
            metadata: document.metadata,
            stats,
        })
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), Pdf2HtmlError> {
    let write_err = |e: std::io::Error| Pdf2HtmlError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(write_err)?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(write_err)?;
    tmp.write_all(bytes).map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

// ── pdfium-backed shortcuts ──────────────────────────────────────────────

/// Convert a PDF file to HTML using pdfium.
///
/// # Example
/// ```rust,no_run
/// use edgequake_pdf2html::{convert, ConversionOptions};
///
/// let output = convert("document.pdf", &ConversionOptions::default())?;
/// std::fs::write("document.html", output.to_html())?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn convert(
    path: impl AsRef<Path>,
    options: &ConversionOptions,
) -> Result<HtmlDocument, Pdf2HtmlError> {
    let path = input::validate_pdf(path.as_ref())?;
    PdfToHtmlConverter::with_pdfium()?.convert(path, options)
}

/// Async wrapper around [`convert`].
pub async fn convert_async(
    path: impl AsRef<Path>,
    options: &ConversionOptions,
) -> Result<HtmlDocument, Pdf2HtmlError> {
    let path = input::validate_pdf(path.as_ref())?;
    PdfToHtmlConverter::with_pdfium()?
        .convert_async(path, options)
        .await
}

/// Convert a PDF and atomically write the HTML to `output_path`.
pub fn convert_to_file(
    path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    options: &ConversionOptions,
) -> Result<ConversionStats, Pdf2HtmlError> {
    let path = input::validate_pdf(path.as_ref())?;
    PdfToHtmlConverter::with_pdfium()?.convert_to_file(path, output_path, options)
}

/// Convert PDF bytes held in memory.
pub fn convert_from_bytes(
    bytes: &[u8],
    options: &ConversionOptions,
) -> Result<HtmlDocument, Pdf2HtmlError> {
    PdfToHtmlConverter::with_pdfium()?.convert_from_bytes(bytes, options)
}

/// Extract PDF metadata without converting content.
pub fn inspect(
    path: impl AsRef<Path>,
    password: Option<&str>,
) -> Result<DocumentMetadata, Pdf2HtmlError> {
    let path = input::validate_pdf(path.as_ref())?;
    PdfToHtmlConverter::with_pdfium()?.inspect(path, password)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atomic_write_creates_parent_and_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested/out.html");
        write_atomic(&out, b"first").unwrap();
        write_atomic(&out, b"second").unwrap();
        assert_eq!(std::fs::read(&out).unwrap(), b"second");
        let leftovers = std::fs::read_dir(out.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn shortcut_reports_missing_file_before_binding_pdfium() {
        let err = convert("/no/such/file.pdf", &ConversionOptions::default()).unwrap_err();
        assert!(matches!(err, Pdf2HtmlError::FileNotFound { .. }));
    }
}
