//! Progress-callback trait for per-page conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionOptionsBuilder::progress_callback`] to receive
//! events as the converter works through the document.
//!
//! # Example
//!
//! ```rust
//! use edgequake_pdf2html::{ConversionProgressCallback, ConversionOptions};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: AtomicUsize,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_page_complete(&self, page_num: usize, total_pages: usize, html_len: usize) {
//!         self.completed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("Page {}/{} done ({} bytes)", page_num, total_pages, html_len);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { completed: AtomicUsize::new(0) });
//!
//! let options = ConversionOptions::builder()
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the converter as it processes each page.
///
/// Pages are converted in order on one thread, so events arrive in page
/// order. Implementations are `Send + Sync` because the async wrapper runs
/// the conversion on a blocking pool thread. All methods default to no-ops.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once the PDF is open, before the first page.
    ///
    /// `total_pages` is the number of selected pages.
    fn on_conversion_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called before a page is extracted.
    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called when a page converted; `html_len` is the fragment length in bytes.
    fn on_page_complete(&self, page_num: usize, total_pages: usize, html_len: usize) {
        let _ = (page_num, total_pages, html_len);
    }

    /// Called when a page was replaced by a placeholder.
    fn on_page_error(&self, page_num: usize, total_pages: usize, error: &str) {
        let _ = (page_num, total_pages, error);
    }

    /// Called once after every page was attempted.
    fn on_conversion_complete(&self, total_pages: usize, success_count: usize) {
        let _ = (total_pages, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// The callback type stored in [`crate::config::ConversionOptions`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
