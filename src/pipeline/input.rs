//! Input validation: the PDF must exist, be readable and start with `%PDF`.
//!
//! Runs before anything touches the filesystem, so a bad path never leaves
//! an image directory behind. pdfium would fail on a non-PDF too, but with a
//! far less useful message.

use crate::error::Pdf2HtmlError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Validate a local PDF path and return it owned.
pub fn validate_pdf(path: &Path) -> Result<PathBuf, Pdf2HtmlError> {
    let path = path.to_path_buf();

    if !path.is_file() {
        return Err(Pdf2HtmlError::FileNotFound { path });
    }

    match std::fs::File::open(&path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            let read = f.read(&mut magic).unwrap_or(0);
            if read < 4 || &magic != b"%PDF" {
                return Err(Pdf2HtmlError::NotAPdf { path, magic });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(Pdf2HtmlError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(Pdf2HtmlError::FileNotFound { path });
        }
    }

    debug!("Validated PDF input: {}", path.display());
    Ok(path)
}

/// File stem of `path`, used as the fallback document title.
pub fn title_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "Document".to_string())
}
