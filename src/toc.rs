//! Table of contents built from rendered headings.
//!
//! The article page shows an outline of its second and third level
//! headings and highlights the entry for the section currently in view.
//! Both work from the heading list returned by
//! [`MarkdownRenderer::render_document`](crate::MarkdownRenderer::render_document),
//! keyed by the anchor ids the renderer assigned.

use serde::Serialize;

use crate::markdown::Heading;

/// Outline entry linking to a heading anchor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    pub id: String,
    pub text: String,
    pub level: u8,
}

/// Selects headings within a level range for the outline.
///
/// Headings without an id or without text are skipped, since they cannot
/// be linked or labeled.
pub fn entries(headings: &[Heading], min_level: u8, max_level: u8) -> Vec<TocEntry> {
    headings
        .iter()
        .filter(|h| (min_level..=max_level).contains(&h.level))
        .filter(|h| !h.id.is_empty() && !h.text.trim().is_empty())
        .map(|h| TocEntry {
            id: h.id.clone(),
            text: h.text.trim().to_string(),
            level: h.level,
        })
        .collect()
}

/// Outline shown beside an article: `h2` and `h3` headings.
pub fn article_outline(headings: &[Heading]) -> Vec<TocEntry> {
    entries(headings, 2, 3)
}

/// Returns the id of the heading the reader is currently looking at.
///
/// `positions` holds `(id, top)` pairs in document order, with `top` the
/// heading's absolute offset from the page top. The active heading is the
/// last one whose top has scrolled past `scroll_y + top_offset`; before
/// the first heading the first entry is active.
pub fn active_entry<'a>(
    positions: &'a [(String, f64)],
    scroll_y: f64,
    top_offset: f64,
) -> Option<&'a str> {
    let (first_id, _) = positions.first()?;
    let threshold = scroll_y + top_offset + 1.0;

    let mut current = first_id.as_str();
    for (id, top) in positions {
        if *top <= threshold {
            current = id.as_str();
        } else {
            break;
        }
    }

    Some(current)
}
