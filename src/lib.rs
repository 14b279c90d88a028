//! Markdown rendering for a personal blog.

mod assets;
pub mod components;
mod config;
pub mod envelope;
mod highlight;
mod markdown;
pub mod toc;
mod util;

pub use assets::{stylesheet, write_css_assets};
pub use config::{Config, OutputFormat};
pub use envelope::{ApiResponse, BackendError, BackendResponse, ErrorResponse, format_timestamps};
pub use highlight::{Highlighted, Highlighter, theme_css, theme_names};
pub use markdown::code_block::{normalize_language, render as render_code_block};
pub use markdown::{
    HEADING_CLASS, Heading, MAX_NESTING_DEPTH, MarkdownRenderer, RenderedDocument, Slugger,
    render_markdown, slugify,
};
pub use toc::TocEntry;
pub use util::{DEFAULT_TIMEZONE, escape_html, estimate_reading_time, format_date, parse_date_time};
