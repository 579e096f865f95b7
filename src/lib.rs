//! # edgequake-pdf2html
//!
//! Convert PDF documents to styled, responsive HTML.
//!
//! Each page's text is extracted with pdfium, split into paragraphs,
//! classified as headings or body text, optionally styled and positioned, and
//! emitted into a single self-contained HTML document with embedded CSS.
//! Page images can be rasterised (or pulled from the PDF) into a storage
//! directory and linked through a public URL prefix.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input     validate path and %PDF magic
//!  ├─ 2. Storage   create the image directory
//!  ├─ 3. Parse     pdfium text runs, fonts, media boxes (PdfParser)
//!  ├─ 4. Blocks    paragraphs → style → heading / paragraph → position
//!  ├─ 5. Images    rasterise or extract, encode, store (PageRasterizer)
//!  └─ 6. Assemble  page fragments + responsive stylesheet + document shell
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_pdf2html::{convert, ConversionOptions};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let options = ConversionOptions::builder()
//!         .dpi(150)
//!         .image_dir("public/pdf-images")
//!         .public_url_prefix("/pdf-images")
//!         .build()?;
//!     let output = convert("document.pdf", &options)?;
//!     std::fs::write("document.html", output.to_html())?;
//!     eprintln!("{} pages, {} images", output.stats.processed_pages, output.stats.images_written);
//!     Ok(())
//! }
//! ```
//!
//! ## Custom backends
//!
//! [`PdfToHtmlConverter`] takes any [`PdfParser`] and [`PageRasterizer`];
//! the pdfium implementation is [`PdfiumBackend`].
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2html` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! edgequake-pdf2html = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod backend;
pub mod config;
pub mod convert;
pub mod error;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use backend::{PageRasterizer, PdfParser, PdfiumBackend, TextSource};
pub use config::{
    Breakpoints, ColorFormat, ConversionOptions, ConversionOptionsBuilder, CssClasses,
    ImageFormat, ImageMode, PageSelection,
};
pub use convert::{
    convert, convert_async, convert_from_bytes, convert_to_file, inspect, PdfToHtmlConverter,
};
pub use error::{ErrorKind, PageError, Pdf2HtmlError};
pub use output::{ConversionStats, DocumentMetadata, HtmlDocument, PageResult};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
