//! Error types for the edgequake-pdf2html library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Pdf2HtmlError`] is **fatal**: the conversion cannot proceed at all
//!   (missing input, unreadable or encrypted PDF, image directory cannot be
//!   created). Returned as `Err(Pdf2HtmlError)` from the top-level `convert*`
//!   functions.
//!
//! * [`PageError`] is **non-fatal**: text extraction or imaging failed for a
//!   single page. Stored inside [`crate::output::PageResult`]; the page is
//!   rendered as a placeholder (or without the image) and the rest of the
//!   document converts normally.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the edgequake-pdf2html library.
///
/// Page-level failures use [`PageError`] and are stored in
/// [`crate::output::PageResult`] rather than propagated here.
#[derive(Debug, Error)]
pub enum Pdf2HtmlError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found at path: '{path}'")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("Failed to convert PDF '{path}': document is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    // ── Storage errors ────────────────────────────────────────────────────
    /// The image output directory could not be created.
    #[error("Cannot create image directory '{path}': {source}")]
    StorageSetupFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not create or write the output HTML file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder or JSON validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
You can:\n\
  • Place libpdfium next to the executable or in the working directory.\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy.\n\
  • Install pdfium system-wide.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse classification of fatal errors.
///
/// HTTP-facing callers map these to a response status via
/// [`Pdf2HtmlError::status_code`]; recoverable [`PageError`]s never reach them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InputNotFound,
    ParseFailure,
    StorageSetupFailure,
    Config,
    Output,
    Internal,
}

impl Pdf2HtmlError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Pdf2HtmlError::FileNotFound { .. } | Pdf2HtmlError::PermissionDenied { .. } => {
                ErrorKind::InputNotFound
            }
            Pdf2HtmlError::NotAPdf { .. }
            | Pdf2HtmlError::CorruptPdf { .. }
            | Pdf2HtmlError::PasswordRequired { .. }
            | Pdf2HtmlError::WrongPassword { .. } => ErrorKind::ParseFailure,
            Pdf2HtmlError::StorageSetupFailed { .. } => ErrorKind::StorageSetupFailure,
            Pdf2HtmlError::OutputWriteFailed { .. } => ErrorKind::Output,
            Pdf2HtmlError::InvalidConfig(_) => ErrorKind::Config,
            Pdf2HtmlError::PdfiumBindingFailed(_) | Pdf2HtmlError::Internal(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// HTTP status a request handler should answer with.
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::InputNotFound => 404,
            ErrorKind::ParseFailure | ErrorKind::Config => 400,
            ErrorKind::StorageSetupFailure | ErrorKind::Output | ErrorKind::Internal => 500,
        }
    }
}

/// A non-fatal error for a single page.
///
/// Stored alongside [`crate::output::PageResult`] when a page (or one of its
/// images) fails. The overall conversion continues.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
pub enum PageError {
    /// The parser could not produce text for this page.
    #[error("Page {page}: text extraction failed: {detail}")]
    ExtractionFailed { page: usize, detail: String },

    /// Rasterisation, encoding or writing of an image failed.
    #[error("Page {page}: image extraction failed: {detail}")]
    ImageFailed { page: usize, detail: String },
}

impl PageError {
    /// 1-indexed page number the error belongs to.
    pub fn page(&self) -> usize {
        match self {
            PageError::ExtractionFailed { page, .. } | PageError::ImageFailed { page, .. } => *page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display_mentions_path() {
        let e = Pdf2HtmlError::FileNotFound {
            path: PathBuf::from("missing.pdf"),
        };
        let msg = e.to_string();
        assert!(msg.contains("PDF file not found at path"), "got: {msg}");
        assert!(msg.contains("missing.pdf"));
        assert_eq!(e.kind(), ErrorKind::InputNotFound);
        assert_eq!(e.status_code(), 404);
    }

    #[test]
    fn parse_failures_are_client_errors() {
        let e = Pdf2HtmlError::CorruptPdf {
            path: PathBuf::from("bad.pdf"),
            detail: "xref".into(),
        };
        assert_eq!(e.kind(), ErrorKind::ParseFailure);
        assert_eq!(e.status_code(), 400);

        let e = Pdf2HtmlError::PasswordRequired {
            path: PathBuf::from("locked.pdf"),
        };
        assert_eq!(e.kind(), ErrorKind::ParseFailure);
    }

    #[test]
    fn storage_failure_is_server_error() {
        let e = Pdf2HtmlError::StorageSetupFailed {
            path: PathBuf::from("/root/x"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert_eq!(e.kind(), ErrorKind::StorageSetupFailure);
        assert_eq!(e.status_code(), 500);
    }

    #[test]
    fn page_error_display_and_page() {
        let e = PageError::ImageFailed {
            page: 3,
            detail: "render".into(),
        };
        assert!(e.to_string().contains("Page 3"));
        assert_eq!(e.page(), 3);
    }
}
