//! Conversion results: the HTML document, per-page outcomes and stats.

use crate::error::{PageError, Pdf2HtmlError};
use crate::model::ImageRef;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The result of a conversion.
#[derive(Debug, Clone, Serialize)]
pub struct HtmlDocument {
    /// The complete, self-contained HTML document.
    pub html: String,
    /// Per-page outcomes, in page order.
    pub pages: Vec<PageResult>,
    pub metadata: DocumentMetadata,
    pub stats: ConversionStats,
}

impl HtmlDocument {
    pub fn to_html(&self) -> &str {
        &self.html
    }

    /// Image files written by this conversion.
    pub fn image_files(&self) -> impl Iterator<Item = &std::path::Path> {
        self.pages
            .iter()
            .flat_map(|p| p.images.iter())
            .filter_map(|i| i.path.as_deref())
    }

    /// `{"success": true, "html": "..."}`, the shape HTTP handlers answer with.
    pub fn to_json_response(&self) -> serde_json::Value {
        serde_json::json!({
            "success": true,
            "html": self.html,
        })
    }
}

impl fmt::Display for HtmlDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.html)
    }
}

/// `{"success": false, "message": "..."}` for a failed conversion.
pub fn error_response(err: &Pdf2HtmlError) -> serde_json::Value {
    serde_json::json!({
        "success": false,
        "message": err.to_string(),
        "kind": err.kind(),
    })
}

/// Outcome of one page.
#[derive(Debug, Clone, Serialize)]
pub struct PageResult {
    /// 1-indexed page number.
    pub page_num: usize,
    pub blocks: usize,
    pub headings: usize,
    pub images: Vec<ImageRef>,
    /// Byte length of the page fragment.
    pub html_len: usize,
    /// Set when the page was replaced by a placeholder.
    pub error: Option<PageError>,
    /// Images that were dropped.
    pub image_errors: Vec<PageError>,
}

impl PageResult {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Document-level information from the PDF.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<String>,
    pub modification_date: Option<String>,
    pub page_count: usize,
    pub pdf_version: String,
}

/// Counters for one conversion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Pages in the PDF.
    pub total_pages: usize,
    /// Pages converted with content.
    pub processed_pages: usize,
    /// Pages rendered as placeholders.
    pub failed_pages: usize,
    pub images_written: usize,
    pub image_failures: usize,
    pub total_duration_ms: u64,
}
