//! Pipeline stages for PDF-to-HTML conversion.
//!
//! Each submodule implements exactly one transformation step and is testable
//! on its own, without pdfium.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ style ──▶ classify ──▶ geometry ──▶ images ──▶ assemble
//! (%PDF)    (blocks)    (fonts)   (h2 / p)     (px)         (files)    (HTML+CSS)
//! ```
//!
//! 1. [`input`]: validate the PDF path before any filesystem write
//! 2. [`extract`]: page text or runs → ordered paragraphs
//! 3. [`style`]: font, weight, colour and alignment per block
//! 4. [`classify`]: heading vs. paragraph
//! 5. [`geometry`]: points → CSS pixels, y-axis flip
//! 6. [`images`]: rasterise or pull embedded images, encode and store
//! 7. [`assemble`]: page fragments and the document shell, with the
//!    stylesheet from [`css`] and colours from [`color`]

pub mod assemble;
pub mod classify;
pub mod color;
pub mod css;
pub mod extract;
pub mod geometry;
pub mod images;
pub mod input;
pub mod style;
