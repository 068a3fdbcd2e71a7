//! Review panel geometry and diff rendering.
//!
//! Pure functions; the browser layer turns their output into DOM.

use serde::Serialize;

use crate::diff::tokenize;
use crate::types::DiffHunk;

/// Distance kept above the surface.
const PANEL_RISE: f64 = 120.0;
const PANEL_WIDTH: f64 = 400.0;
const EDGE_MARGIN: f64 = 10.0;

/// A viewport-relative box, as from `getBoundingClientRect`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}

/// Document-relative top-left corner for the panel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanelPlacement {
    pub top: f64,
    pub left: f64,
}

/// Place the panel above the surface, or below it when there is no room.
///
/// `scroll` is the page offset `(x, y)`. The panel never runs past the right
/// edge of the viewport.
pub fn anchor_panel(surface: Rect, scroll: (f64, f64), viewport_width: f64) -> PanelPlacement {
    let (scroll_x, scroll_y) = scroll;

    let above = surface.top + scroll_y - PANEL_RISE;
    let top = if above < EDGE_MARGIN {
        surface.bottom + scroll_y + EDGE_MARGIN
    } else {
        above
    };

    let mut left = surface.left + scroll_x;
    if left + PANEL_WIDTH > viewport_width - EDGE_MARGIN {
        left = (viewport_width - PANEL_WIDTH - EDGE_MARGIN).max(EDGE_MARGIN);
    }

    PanelPlacement { top, left }
}

/// A run of panel text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "camelCase")]
pub enum Segment {
    Same(String),
    Removed(String),
    Added(String),
}

impl Segment {
    pub fn text(&self) -> &str {
        match self {
            Segment::Same(text) | Segment::Removed(text) | Segment::Added(text) => text,
        }
    }
}

/// Interleave unchanged original text with each hunk's removed and added
/// text, in order.
pub fn render_segments(original: &str, hunks: &[DiffHunk]) -> Vec<Segment> {
    let tokens = tokenize(original);
    let mut segments = Vec::new();
    let mut same = String::new();
    let mut cursor = 0;

    for hunk in hunks {
        let start = hunk.original_span.start.min(tokens.len());
        for token in &tokens[cursor.min(start)..start] {
            same.push_str(token.text);
        }
        if !same.is_empty() {
            segments.push(Segment::Same(std::mem::take(&mut same)));
        }
        if !hunk.original_text.is_empty() {
            segments.push(Segment::Removed(hunk.original_text.clone()));
        }
        if !hunk.refined_text.is_empty() {
            segments.push(Segment::Added(hunk.refined_text.clone()));
        }
        cursor = hunk.original_span.end.max(start);
    }

    for token in tokens.iter().skip(cursor) {
        same.push_str(token.text);
    }
    if !same.is_empty() {
        segments.push(Segment::Same(same));
    }
    segments
}
