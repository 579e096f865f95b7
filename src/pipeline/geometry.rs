//! PDF user space (points, bottom-up) → CSS pixels (top-down).

use crate::backend::{PageSize, PdfRect, TextMatrix};
use crate::model::{Position, Size};

/// CSS pixels per PDF point.
pub const PX_PER_PT: f32 = 96.0 / 72.0;

/// Vertical step between stacked blocks when no position is known.
pub const STACK_STEP_PX: f32 = 24.0;

pub fn pt_to_px(pt: f32) -> f32 {
    sanitize(pt * PX_PER_PT)
}

fn sanitize(v: f32) -> f32 {
    if v.is_finite() && v > 0.0 {
        v
    } else {
        0.0
    }
}

/// Media box, or `fallback` when it is missing or degenerate.
pub fn page_size(size: Option<PageSize>, fallback: PageSize) -> PageSize {
    match size {
        Some(s)
            if s.width_pt.is_finite()
                && s.height_pt.is_finite()
                && s.width_pt > 0.0
                && s.height_pt > 0.0 =>
        {
            s
        }
        _ => fallback,
    }
}

/// Page dimensions in pixels.
pub fn page_size_px(size: PageSize) -> Size {
    Size {
        width: pt_to_px(size.width_pt),
        height: pt_to_px(size.height_pt),
    }
}

/// Top-left position of a block whose text matrix is `matrix`.
///
/// Without a matrix, blocks stack down the page: block `index` sits at
/// `(0, index * 24px)`.
pub fn block_position(matrix: Option<&TextMatrix>, page: PageSize, index: usize) -> Position {
    match matrix {
        Some(m) => Position {
            x: pt_to_px(m.e),
            y: pt_to_px(page.height_pt - m.f),
        },
        None => Position {
            x: 0.0,
            y: sanitize(index as f32 * STACK_STEP_PX),
        },
    }
}

/// Position and size of a rectangle on the page.
pub fn rect_to_css(rect: &PdfRect, page: PageSize) -> (Position, Size) {
    let top = rect.top.max(rect.bottom);
    let left = rect.left.min(rect.right);
    (
        Position {
            x: pt_to_px(left),
            y: pt_to_px(page.height_pt - top),
        },
        Size {
            width: pt_to_px(rect.width()),
            height: pt_to_px(rect.height()),
        },
    )
}
