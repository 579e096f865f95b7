//! Pipeline integration tests against hand-built parser/rasteriser fakes.
//!
//! These run without pdfium: the fakes hand the converter exactly the pages,
//! runs and bitmaps each test needs. Real-PDF coverage lives in `e2e.rs`.

use edgequake_pdf2html::backend::{
    EmbeddedImage, FontInfo, PageRasterizer, PageSize, ParsedDocument, ParsedPage, PdfParser,
    PdfRect, PdfSource, TextMatrix, TextRun,
};
use edgequake_pdf2html::pipeline::color::PdfColor;
use edgequake_pdf2html::{
    ConversionOptions, ConversionProgressCallback, DocumentMetadata, ErrorKind, ImageFormat,
    ImageMode, PageError, PageSelection, Pdf2HtmlError, PdfToHtmlConverter,
};
use image::{DynamicImage, Rgb, RgbImage};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

// ── Fakes ────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy)]
enum OpenFailure {
    PasswordRequired,
    Corrupt,
}

struct FakeParser {
    pages: Vec<Result<ParsedPage, PageError>>,
    title: Option<String>,
    fonts_seen: Vec<String>,
    failure: Option<OpenFailure>,
}

impl FakeParser {
    fn new(pages: Vec<ParsedPage>) -> Self {
        Self {
            pages: pages.into_iter().map(Ok).collect(),
            title: None,
            fonts_seen: Vec::new(),
            failure: None,
        }
    }
}

impl PdfParser for FakeParser {
    fn parse(
        &self,
        source: &PdfSource<'_>,
        selection: &PageSelection,
    ) -> Result<ParsedDocument, Pdf2HtmlError> {
        match self.failure {
            Some(OpenFailure::PasswordRequired) => {
                return Err(Pdf2HtmlError::PasswordRequired {
                    path: source.path.to_path_buf(),
                })
            }
            Some(OpenFailure::Corrupt) => {
                return Err(Pdf2HtmlError::CorruptPdf {
                    path: source.path.to_path_buf(),
                    detail: "startxref not found".into(),
                })
            }
            None => {}
        }

        let pages = selection
            .to_indices(self.pages.len())
            .into_iter()
            .map(|i| {
                self.pages[i].clone().map(|mut p| {
                    if p.fonts.is_empty() {
                        p.fonts = self.fonts_seen.clone();
                    }
                    p
                })
            })
            .collect();
        Ok(ParsedDocument {
            metadata: DocumentMetadata {
                title: self.title.clone(),
                page_count: self.pages.len(),
                pdf_version: "Pdf1_4".into(),
                ..DocumentMetadata::default()
            },
            pages,
        })
    }
}

struct FakeRasterizer {
    bitmap: DynamicImage,
    failing_pages: Vec<usize>,
    embedded: Vec<EmbeddedImage>,
    calls: AtomicUsize,
}

impl FakeRasterizer {
    fn new() -> Self {
        Self {
            bitmap: gradient(64, 48),
            failing_pages: Vec::new(),
            embedded: Vec::new(),
            calls: AtomicUsize::new(0),
        }
    }
}

impl PageRasterizer for FakeRasterizer {
    fn rasterize(
        &self,
        _source: &PdfSource<'_>,
        page_index: usize,
        _dpi: u32,
    ) -> Result<DynamicImage, PageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_pages.contains(&(page_index + 1)) {
            return Err(PageError::ImageFailed {
                page: page_index + 1,
                detail: "render failed".into(),
            });
        }
        Ok(self.bitmap.clone())
    }

    fn embedded_images(
        &self,
        _source: &PdfSource<'_>,
        _page_index: usize,
    ) -> Result<Vec<EmbeddedImage>, PageError> {
        Ok(self.embedded.clone())
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn gradient(w: u32, h: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(w, h, |x, y| {
        Rgb([(x * 4) as u8, (y * 5) as u8, ((x + y) * 3) as u8])
    }))
}

struct Workspace {
    dir: TempDir,
    pdf: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let pdf = dir.path().join("sample.pdf");
        std::fs::write(&pdf, b"%PDF-1.4\n% placeholder body\n").expect("write pdf");
        Self { dir, pdf }
    }

    fn image_dir(&self) -> PathBuf {
        self.dir.path().join("storage/app/public/pdf-images")
    }

    fn options(&self) -> ConversionOptions {
        ConversionOptions::builder()
            .image_dir(self.image_dir())
            .build()
            .expect("valid options")
    }
}

fn text_page(number: usize, text: &str) -> ParsedPage {
    ParsedPage {
        number,
        size: Some(PageSize {
            width_pt: 612.0,
            height_pt: 792.0,
        }),
        text: Some(text.to_string()),
        ..ParsedPage::default()
    }
}

fn styled_run(text: &str, size: f32, weight: u16, x: f32, y: f32) -> TextRun {
    TextRun {
        text: text.into(),
        font: Some(FontInfo {
            name: Some("Helvetica".into()),
            size: Some(size),
            weight: Some(weight),
            italic: false,
        }),
        color: Some(PdfColor::Normalized([0.0, 0.0, 0.0])),
        matrix: Some(TextMatrix::translation(x, y)),
    }
}

fn converter(parser: FakeParser, rasterizer: FakeRasterizer) -> PdfToHtmlConverter {
    PdfToHtmlConverter::new(Arc::new(parser), Arc::new(rasterizer))
}

fn files_in(dir: &Path) -> Vec<PathBuf> {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
        Err(_) => Vec::new(),
    }
}

// ── Scenarios ────────────────────────────────────────────────────────────────

#[test]
fn plain_text_page_becomes_paragraph() {
    let ws = Workspace::new();
    let conv = converter(
        FakeParser::new(vec![text_page(1, "Test PDF Content")]),
        FakeRasterizer::new(),
    );
    let options = ConversionOptions {
        extract_images: false,
        ..ws.options()
    };

    let out = conv.convert(&ws.pdf, &options).expect("conversion succeeds");

    assert!(out.html.contains("<p class=\"pdf-paragraph\">Test PDF Content</p>"));
    assert!(out.html.contains("<style>"));
    assert!(out.html.contains("<div class=\"pdf-container\">"));
    assert!(out.html.contains("<div class=\"pdf-page\" data-page=\"1\">"));
    assert!(out.html.contains("<title>sample</title>"));
    assert_eq!(out.stats.processed_pages, 1);
    assert!(!ws.image_dir().exists(), "no images, no directory");
}

#[test]
fn page_image_is_linked_under_public_prefix() {
    let ws = Workspace::new();
    let conv = converter(
        FakeParser::new(vec![text_page(1, "Figure page")]),
        FakeRasterizer::new(),
    );

    let out = conv.convert(&ws.pdf, &ws.options()).expect("conversion succeeds");

    assert!(
        out.html
            .contains("<img class=\"pdf-image\" src=\"/storage/pdf-images/page_1_"),
        "{}",
        out.html
    );
    assert!(out.html.contains("alt=\"Page 1 Image\""));

    let files: Vec<_> = out.image_files().collect();
    assert_eq!(files.len(), 1);
    assert!(files[0].exists());
    assert!(files[0].starts_with(ws.image_dir()));
    let name = files[0].file_name().unwrap().to_string_lossy().into_owned();
    assert!(out.html.contains(&format!("/storage/pdf-images/{name}")));
    assert_eq!(out.stats.images_written, 1);
}

#[test]
fn uppercase_bold_line_becomes_heading() {
    let ws = Workspace::new();
    let page = ParsedPage {
        number: 1,
        size: Some(PageSize {
            width_pt: 612.0,
            height_pt: 792.0,
        }),
        runs: vec![styled_run("TEST TITLE", 16.0, 700, 72.0, 720.0)],
        fonts: vec!["Helvetica".into()],
        ..ParsedPage::default()
    };
    let conv = converter(FakeParser::new(vec![page]), FakeRasterizer::new());
    let options = ConversionOptions {
        extract_images: false,
        ..ws.options()
    };

    let out = conv.convert(&ws.pdf, &options).expect("conversion succeeds");

    assert!(out.html.contains("<h2 class=\"pdf-heading\""), "{}", out.html);
    assert!(out.html.contains(">TEST TITLE</h2>"));
    assert!(!out.html.contains("<p class=\"pdf-paragraph\""));
    assert_eq!(out.pages[0].headings, 1);
}

#[test]
fn uppercase_small_regular_line_stays_paragraph() {
    let ws = Workspace::new();
    let page = ParsedPage {
        number: 1,
        runs: vec![styled_run("FOOTNOTE TEXT", 9.0, 400, 72.0, 60.0)],
        ..ParsedPage::default()
    };
    let conv = converter(FakeParser::new(vec![page]), FakeRasterizer::new());
    let options = ConversionOptions {
        extract_images: false,
        ..ws.options()
    };

    let out = conv.convert(&ws.pdf, &options).unwrap();
    assert!(out.html.contains("<p class=\"pdf-paragraph\""));
    assert_eq!(out.pages[0].headings, 0);

    // Font metrics still decide the kind when styles are not emitted.
    let unstyled = ConversionOptions {
        preserve_styles: false,
        ..options.clone()
    };
    let out = conv.convert(&ws.pdf, &unstyled).unwrap();
    assert_eq!(out.pages[0].headings, 0);
    assert!(out.html.contains("<p class=\"pdf-paragraph\">FOOTNOTE TEXT</p>"));
    assert!(!out.html.contains("font-size"));

    // Only text without any font metadata falls back to the content rule.
    let conv = converter(
        FakeParser::new(vec![text_page(1, "FOOTNOTE TEXT")]),
        FakeRasterizer::new(),
    );
    let out = conv.convert(&ws.pdf, &options).unwrap();
    assert!(out.html.contains("<h2 class=\"pdf-heading\">FOOTNOTE TEXT</h2>"));
}

#[test]
fn encrypted_pdf_fails_without_output_or_litter() {
    let ws = Workspace::new();
    let mut parser = FakeParser::new(vec![text_page(1, "secret")]);
    parser.failure = Some(OpenFailure::PasswordRequired);
    let conv = converter(parser, FakeRasterizer::new());
    let out_file = ws.dir.path().join("out/result.html");

    let err = conv
        .convert_to_file(&ws.pdf, &out_file, &ws.options())
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ParseFailure);
    assert!(err.to_string().contains("password"), "{err}");
    assert!(!out_file.exists());
    assert!(files_in(&ws.image_dir()).is_empty());
}

#[test]
fn corrupt_pdf_is_parse_failure() {
    let ws = Workspace::new();
    let mut parser = FakeParser::new(vec![]);
    parser.failure = Some(OpenFailure::Corrupt);
    let conv = converter(parser, FakeRasterizer::new());

    let err = conv.convert(&ws.pdf, &ws.options()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ParseFailure);
    assert_eq!(err.status_code(), 400);
    assert!(err.to_string().contains("startxref"));
}

// ── Properties ───────────────────────────────────────────────────────────────

#[test]
fn hand_built_options_are_validated() {
    let ws = Workspace::new();
    let conv = converter(
        FakeParser::new(vec![text_page(1, "text")]),
        FakeRasterizer::new(),
    );
    let mut options = ws.options();
    options.css_classes.page = "pdf-page\" onclick=\"x".into();

    let err = conv.convert(&ws.pdf, &options).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
    assert!(!ws.image_dir().exists());
}

#[test]
fn missing_input_fails_before_any_write() {
    let ws = Workspace::new();
    let conv = converter(FakeParser::new(vec![]), FakeRasterizer::new());

    let err = conv
        .convert(ws.dir.path().join("nope.pdf"), &ws.options())
        .unwrap_err();

    assert!(matches!(err, Pdf2HtmlError::FileNotFound { .. }));
    assert_eq!(err.kind(), ErrorKind::InputNotFound);
    assert!(err.to_string().contains("PDF file not found at path"));
    assert!(!ws.image_dir().exists());
}

#[test]
fn non_pdf_input_is_rejected() {
    let ws = Workspace::new();
    let txt = ws.dir.path().join("notes.pdf");
    std::fs::write(&txt, b"hello").unwrap();
    let conv = converter(FakeParser::new(vec![]), FakeRasterizer::new());

    let err = conv.convert(&txt, &ws.options()).unwrap_err();
    assert!(matches!(err, Pdf2HtmlError::NotAPdf { .. }));
}

#[test]
fn container_present_even_for_empty_document() {
    let ws = Workspace::new();
    let conv = converter(FakeParser::new(vec![]), FakeRasterizer::new());

    let out = conv.convert(&ws.pdf, &ws.options()).unwrap();
    assert!(out.html.contains("<div class=\"pdf-container\">"));
    assert!(out.pages.is_empty());
}

#[test]
fn failed_page_becomes_placeholder() {
    let ws = Workspace::new();
    let mut parser = FakeParser::new(vec![text_page(1, "first"), text_page(3, "third")]);
    parser.pages.insert(
        1,
        Err(PageError::ExtractionFailed {
            page: 2,
            detail: "bad content stream".into(),
        }),
    );

    #[derive(Default)]
    struct Events {
        log: Mutex<Vec<String>>,
    }
    impl ConversionProgressCallback for Events {
        fn on_conversion_start(&self, total: usize) {
            self.log.lock().unwrap().push(format!("start {total}"));
        }
        fn on_page_complete(&self, page: usize, _total: usize, _len: usize) {
            self.log.lock().unwrap().push(format!("ok {page}"));
        }
        fn on_page_error(&self, page: usize, _total: usize, _error: &str) {
            self.log.lock().unwrap().push(format!("err {page}"));
        }
        fn on_conversion_complete(&self, _total: usize, ok: usize) {
            self.log.lock().unwrap().push(format!("done {ok}"));
        }
    }
    let events = Arc::new(Events::default());

    let conv = converter(parser, FakeRasterizer::new());
    let options = ConversionOptions {
        extract_images: false,
        progress_callback: Some(events.clone()),
        ..ws.options()
    };

    let out = conv.convert(&ws.pdf, &options).expect("page errors are not fatal");

    assert!(out.html.contains("Failed to convert page 2"));
    let first = out.html.find("first").unwrap();
    let placeholder = out.html.find("Failed to convert page 2").unwrap();
    let third = out.html.find("third").unwrap();
    assert!(first < placeholder && placeholder < third, "pages stay in order");
    assert_eq!(out.stats.failed_pages, 1);
    assert_eq!(out.stats.processed_pages, 2);
    assert!(out.pages[1].error.is_some());
    assert_eq!(
        *events.log.lock().unwrap(),
        vec!["start 3", "ok 1", "err 2", "ok 3", "done 2"]
    );
}

#[test]
fn failed_image_is_omitted() {
    let ws = Workspace::new();
    let mut raster = FakeRasterizer::new();
    raster.failing_pages = vec![1];
    let conv = converter(
        FakeParser::new(vec![text_page(1, "one"), text_page(2, "two")]),
        raster,
    );

    let out = conv.convert(&ws.pdf, &ws.options()).unwrap();

    assert_eq!(out.stats.processed_pages, 2);
    assert_eq!(out.stats.images_written, 1);
    assert_eq!(out.stats.image_failures, 1);
    assert!(out.pages[0].images.is_empty());
    assert_eq!(out.pages[0].image_errors.len(), 1);
    assert!(!out.html.contains("alt=\"Page 1 Image\""));
    assert!(out.html.contains("alt=\"Page 2 Image\""));
}

#[test]
fn jpeg_quality_is_monotonic_on_disk() {
    assert!(stored_image_size(ImageFormat::Jpeg, 80) >= stored_image_size(ImageFormat::Jpeg, 40));
}

#[test]
fn png_quality_is_monotonic_on_disk() {
    let high = stored_image_size(ImageFormat::Png, 80);
    let mid = stored_image_size(ImageFormat::Png, 40);
    let low = stored_image_size(ImageFormat::Png, 10);
    assert!(high >= mid, "q80={high} q40={mid}");
    assert!(mid >= low, "q40={mid} q10={low}");
}

/// Size on disk of the single page image written at `quality`.
fn stored_image_size(format: ImageFormat, quality: u8) -> u64 {
    let ws = Workspace::new();
    let mut raster = FakeRasterizer::new();
    raster.bitmap = gradient(200, 150);
    let conv = converter(FakeParser::new(vec![text_page(1, "x")]), raster);
    let options = ConversionOptions {
        image_format: format,
        image_quality: quality,
        ..ws.options()
    };
    let out = conv.convert(&ws.pdf, &options).unwrap();
    let path = out.pages[0].images[0].path.clone().unwrap();
    assert!(path.extension().is_some_and(|e| e == format.extension()));
    std::fs::metadata(path).unwrap().len()
}

#[test]
fn embedded_images_skip_full_page_backgrounds() {
    let ws = Workspace::new();
    let mut raster = FakeRasterizer::new();
    raster.embedded = vec![
        EmbeddedImage {
            image: gradient(100, 100),
            bounds: PdfRect {
                left: 0.0,
                bottom: 0.0,
                right: 612.0,
                top: 792.0,
            },
        },
        EmbeddedImage {
            image: gradient(20, 20),
            bounds: PdfRect {
                left: 72.0,
                bottom: 600.0,
                right: 144.0,
                top: 672.0,
            },
        },
    ];
    let conv = converter(FakeParser::new(vec![text_page(1, "logo page")]), raster);
    let options = ConversionOptions {
        image_mode: ImageMode::Embedded,
        preserve_layout: true,
        ..ws.options()
    };

    let out = conv.convert(&ws.pdf, &options).unwrap();

    assert_eq!(out.pages[0].images.len(), 1);
    assert_eq!(out.pages[0].images[0].pixel_width, 20);
    assert!(out.html.contains("position: absolute; left: 96px; top: 160px; width: 96px; height: 96px;"));
    assert!(!out.html.contains("background-image"));
}

#[test]
fn preserve_layout_positions_blocks() {
    let ws = Workspace::new();
    let page = ParsedPage {
        number: 1,
        size: Some(PageSize {
            width_pt: 612.0,
            height_pt: 792.0,
        }),
        runs: vec![
            styled_run("TEST TITLE", 18.0, 700, 250.0, 720.0),
            styled_run("Body text starts here.", 12.0, 400, 72.0, 648.0),
        ],
        ..ParsedPage::default()
    };
    let conv = converter(FakeParser::new(vec![page]), FakeRasterizer::new());
    let options = ConversionOptions {
        extract_images: false,
        preserve_layout: true,
        ..ws.options()
    };

    let out = conv.convert(&ws.pdf, &options).unwrap();

    assert!(out
        .html
        .contains("style=\"position: relative; width: 816px; height: 1056px; padding: 0;\""));
    assert!(out.html.contains("left: 96px; top: 192px;"), "{}", out.html);
    assert!(out.html.contains("text-align: center;"));
    assert!(out.html.contains("color: rgb(0,0,0);"));
}

#[test]
fn plain_text_layout_stacks_blocks() {
    let ws = Workspace::new();
    let conv = converter(
        FakeParser::new(vec![text_page(1, "one\n\ntwo\n\nthree")]),
        FakeRasterizer::new(),
    );
    let options = ConversionOptions {
        extract_images: false,
        preserve_layout: true,
        ..ws.options()
    };

    let out = conv.convert(&ws.pdf, &options).unwrap();
    assert!(out.html.contains("left: 0px; top: 0px;"));
    assert!(out.html.contains("left: 0px; top: 24px;"));
    assert!(out.html.contains("left: 0px; top: 48px;"));
}

#[test]
fn inline_images_need_no_directory() {
    let ws = Workspace::new();
    let conv = converter(
        FakeParser::new(vec![text_page(1, "inline")]),
        FakeRasterizer::new(),
    );
    let options = ConversionOptions {
        embed_images: true,
        ..ws.options()
    };

    let out = conv.convert(&ws.pdf, &options).unwrap();
    assert!(out.html.contains("src=\"data:image/png;base64,"));
    assert!(!ws.image_dir().exists());
    assert_eq!(out.image_files().count(), 0);
}

#[test]
fn font_faces_for_non_standard_fonts() {
    let ws = Workspace::new();
    let mut parser = FakeParser::new(vec![text_page(1, "text")]);
    parser.fonts_seen = vec!["Helvetica".into(), "BCDEFG+Garamond".into()];
    parser.title = Some("Quarterly <Report>".into());
    let conv = converter(parser, FakeRasterizer::new());
    let options = ConversionOptions {
        extract_images: false,
        ..ws.options()
    };

    let out = conv.convert(&ws.pdf, &options).unwrap();
    assert!(out
        .html
        .contains("@font-face { font-family: \"Garamond\"; src: local(\"Garamond\"); }"));
    assert!(!out.html.contains("font-family: \"Helvetica\"; src"));
    assert!(out.html.contains("<title>Quarterly &lt;Report&gt;</title>"));
}

#[test]
fn page_selection_limits_pages() {
    let ws = Workspace::new();
    let conv = converter(
        FakeParser::new(vec![text_page(1, "alpha"), text_page(2, "beta"), text_page(3, "gamma")]),
        FakeRasterizer::new(),
    );
    let options = ConversionOptions {
        extract_images: false,
        pages: PageSelection::Range(2, 3),
        ..ws.options()
    };

    let out = conv.convert(&ws.pdf, &options).unwrap();
    assert!(!out.html.contains("alpha"));
    assert!(out.html.contains("beta") && out.html.contains("gamma"));
    assert_eq!(out.stats.total_pages, 3);

    let options = ConversionOptions {
        pages: PageSelection::Single(9),
        ..options
    };
    let err = conv.convert(&ws.pdf, &options).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
}

#[test]
fn convert_to_file_writes_html() {
    let ws = Workspace::new();
    let conv = converter(
        FakeParser::new(vec![text_page(1, "saved")]),
        FakeRasterizer::new(),
    );
    let out_file = ws.dir.path().join("html/out.html");
    let options = ConversionOptions {
        extract_images: false,
        ..ws.options()
    };

    let stats = conv.convert_to_file(&ws.pdf, &out_file, &options).unwrap();
    assert_eq!(stats.processed_pages, 1);
    let html = std::fs::read_to_string(&out_file).unwrap();
    assert!(html.contains("saved"));
}

#[test]
fn convert_from_bytes_uses_generic_title() {
    let conv = converter(
        FakeParser::new(vec![text_page(1, "from memory")]),
        FakeRasterizer::new(),
    );
    let options = ConversionOptions {
        extract_images: false,
        ..ConversionOptions::default()
    };

    let out = conv
        .convert_from_bytes(b"%PDF-1.7\n", &options)
        .unwrap();
    assert!(out.html.contains("<title>Document</title>"));
    assert!(out.html.contains("from memory"));
}

#[test]
fn rasterizer_is_skipped_when_images_disabled() {
    let ws = Workspace::new();
    let raster = Arc::new(FakeRasterizer::new());
    let conv = PdfToHtmlConverter::new(
        Arc::new(FakeParser::new(vec![text_page(1, "a"), text_page(2, "b")])),
        raster.clone(),
    );
    let options = ConversionOptions {
        extract_images: false,
        ..ws.options()
    };

    conv.convert(&ws.pdf, &options).unwrap();
    assert_eq!(raster.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn async_wrapper_matches_sync() {
    let ws = Workspace::new();
    let conv = converter(
        FakeParser::new(vec![text_page(1, "INTRODUCTION\n\nSome body text.")]),
        FakeRasterizer::new(),
    );
    let options = ConversionOptions {
        extract_images: false,
        ..ws.options()
    };

    let sync = conv.convert(&ws.pdf, &options).unwrap();
    let async_out = conv.convert_async(&ws.pdf, &options).await.unwrap();
    assert_eq!(sync.html, async_out.html);
    assert!(async_out.html.contains("<h2 class=\"pdf-heading\">INTRODUCTION</h2>"));
}
