//! Page text → ordered, trimmed, non-empty paragraphs.
//!
//! Two inputs are accepted through [`TextSource`]:
//!
//! * **Plain text**: split on blank lines, whitespace collapsed.
//! * **Runs with metadata**: consecutive runs are grouped into paragraphs by
//!   vertical gap and font changes, then each group is split the same way.
//!   A group keeps the font, colour and matrix of its first run.

use crate::backend::{FontInfo, TextMatrix, TextRun, TextSource};
use crate::pipeline::color::PdfColor;
use once_cell::sync::Lazy;
use regex::Regex;

/// Blank line: two newlines with only horizontal whitespace between them.
static BLANK_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n[ \t\r\f]*\n").unwrap());

/// Any whitespace run, newlines included.
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Horizontal whitespace only.
static INLINE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\S\n]+").unwrap());

/// Font size assumed for gap tests when a run has none.
const DEFAULT_FONT_SIZE: f32 = 12.0;

/// Gap (in multiples of the larger font size) that starts a new paragraph.
const PARAGRAPH_GAP_FACTOR: f32 = 1.5;

/// Font size change (points) that starts a new paragraph.
const FONT_SIZE_TOLERANCE: f32 = 1.0;

/// An extracted paragraph before classification.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawBlock {
    pub text: String,
    pub font: Option<FontInfo>,
    pub color: Option<PdfColor>,
    pub matrix: Option<TextMatrix>,
}

impl RawBlock {
    fn plain(text: String) -> Self {
        Self {
            text,
            ..Self::default()
        }
    }
}

/// Split `text` into paragraphs on blank lines.
///
/// Each paragraph has its whitespace collapsed to single spaces. With
/// `preserve_line_breaks`, single newlines survive (one per line, each line
/// collapsed and trimmed).
pub fn paragraphs(text: &str, preserve_line_breaks: bool) -> Vec<String> {
    let text = text.replace("\r\n", "\n");
    BLANK_LINE
        .split(&text)
        .filter_map(|candidate| {
            let para = if preserve_line_breaks {
                candidate
                    .lines()
                    .map(|line| INLINE_WHITESPACE.replace_all(line.trim(), " ").into_owned())
                    .filter(|line| !line.is_empty())
                    .collect::<Vec<_>>()
                    .join("\n")
            } else {
                WHITESPACE.replace_all(candidate.trim(), " ").into_owned()
            };
            (!para.is_empty()).then_some(para)
        })
        .collect()
}

/// Extract the blocks of one page in reading order.
pub fn extract_blocks<S: TextSource + ?Sized>(
    source: &S,
    preserve_line_breaks: bool,
) -> Vec<RawBlock> {
    let runs = source.runs();
    if runs.is_empty() || !runs.iter().any(TextRun::has_metadata) {
        return paragraphs(&source.text(), preserve_line_breaks)
            .into_iter()
            .map(RawBlock::plain)
            .collect();
    }

    let mut blocks = Vec::new();
    for group in group_runs(runs) {
        let first = group[0];
        let text = group
            .iter()
            .map(|r| r.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        for para in paragraphs(&text, preserve_line_breaks) {
            blocks.push(RawBlock {
                text: para,
                font: first.font.clone(),
                color: first.color.clone(),
                matrix: first.matrix,
            });
        }
    }
    blocks
}

fn group_runs(runs: &[TextRun]) -> Vec<Vec<&TextRun>> {
    let mut groups: Vec<Vec<&TextRun>> = Vec::new();
    for run in runs {
        if run.text.trim().is_empty() {
            continue;
        }
        match groups.last_mut() {
            Some(group) if !starts_paragraph(group[group.len() - 1], run) => group.push(run),
            _ => groups.push(vec![run]),
        }
    }
    groups
}

fn font_size(run: &TextRun) -> Option<f32> {
    run.font.as_ref().and_then(|f| f.size)
}

fn is_bold(run: &TextRun) -> bool {
    run.font.as_ref().is_some_and(FontInfo::is_bold)
}

/// Whether `next` begins a new paragraph after `prev`.
fn starts_paragraph(prev: &TextRun, next: &TextRun) -> bool {
    if let (Some(a), Some(b)) = (font_size(prev), font_size(next)) {
        if (a - b).abs() > FONT_SIZE_TOLERANCE {
            return true;
        }
    }
    if is_bold(prev) != is_bold(next) {
        return true;
    }
    if let (Some(a), Some(b)) = (prev.matrix, next.matrix) {
        let size = font_size(prev)
            .unwrap_or(DEFAULT_FONT_SIZE)
            .max(font_size(next).unwrap_or(DEFAULT_FONT_SIZE));
        if (a.f - b.f).abs() > PARAGRAPH_GAP_FACTOR * size {
            return true;
        }
    }
    false
}
