//! Markdown rendering with GitHub Flavored Markdown support.
//!
//! This module renders blog markdown using comrak with GFM extensions
//! (tables, strikethrough, autolinks, task lists, footnotes), assigns
//! unique anchor ids to headings, and wraps highlighted code blocks in
//! copyable containers.

pub mod code_block;
mod renderer;
mod sanitize;
mod slug;

pub use renderer::{
    HEADING_CLASS, Heading, MAX_NESTING_DEPTH, MarkdownRenderer, RenderedDocument, render_markdown,
};
pub use slug::{Slugger, slugify};
