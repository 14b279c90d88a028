//! Markdown rendering with GitHub Flavored Markdown support.

use anyhow::{Context, Result, bail};
use comrak::nodes::{AstNode, NodeHtmlBlock, NodeValue};
use comrak::{Arena, Options};
use serde::Serialize;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use tracing::warn;

use super::slug::Slugger;
use super::{code_block, sanitize};
use crate::highlight::Highlighter;
use crate::util::escape_html;

/// Class on every heading reserving scroll offset below the fixed header.
pub const HEADING_CLASS: &str = "scroll-mt-24";

/// Deepest blockquote and list nesting accepted by the parser.
///
/// Container nesting recurses in comrak, and a stack overflow aborts the
/// process instead of unwinding.
pub const MAX_NESTING_DEPTH: usize = 256;

/// Heading emitted by the renderer, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heading {
    /// Heading level, 1 through 6.
    pub level: u8,
    /// Unique anchor id assigned within the document.
    pub id: String,
    /// Plain heading text without inline markup.
    pub text: String,
}

/// Rendered HTML together with the headings it contains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedDocument {
    pub html: String,
    pub headings: Vec<Heading>,
}

/// Renders markdown to HTML with GitHub Flavored Markdown extensions.
///
/// Provides GFM extensions including tables, strikethrough, autolinks,
/// task lists and footnotes. Every heading gets a unique anchor id, and
/// every code block is highlighted and wrapped in a copyable container.
/// Output is sanitized unless the renderer was created with
/// [`MarkdownRenderer::trusted`].
///
/// The renderer holds no per document state; each call creates its own
/// slug registry, so one renderer can serve concurrent callers.
pub struct MarkdownRenderer {
    highlighter: &'static Highlighter,
    sanitize: bool,
}

impl MarkdownRenderer {
    /// Creates renderer that sanitizes its output.
    pub fn new() -> Self {
        Self {
            highlighter: Highlighter::shared(),
            sanitize: true,
        }
    }

    /// Creates renderer that passes raw HTML in the source through.
    ///
    /// Intended for content written by the site owner, such as the admin
    /// preview pane.
    pub fn trusted() -> Self {
        Self {
            highlighter: Highlighter::shared(),
            sanitize: false,
        }
    }

    /// Renders markdown content to HTML string.
    ///
    /// # Errors
    ///
    /// Returns error if the HTML formatter fails to write output
    pub fn render(&self, content: &str) -> Result<String> {
        self.render_document(content).map(|document| document.html)
    }

    /// Renders markdown content and collects its headings.
    ///
    /// Parses markdown into an AST, rewrites headings and code blocks in
    /// place, formats the tree to HTML and optionally sanitizes it.
    ///
    /// # Arguments
    ///
    /// * `content`: Markdown content to render
    ///
    /// # Returns
    ///
    /// Rendered HTML and the heading outline in document order
    ///
    /// # Errors
    ///
    /// Returns error if blockquotes or lists nest deeper than
    /// [`MAX_NESTING_DEPTH`], or the HTML formatter fails to write output
    pub fn render_document(&self, content: &str) -> Result<RenderedDocument> {
        let depth = nesting_depth(content);
        if depth > MAX_NESTING_DEPTH {
            bail!(
                "Markdown nests {} levels deep, limit is {}",
                depth,
                MAX_NESTING_DEPTH
            );
        }

        let options = parser_options();
        let arena = Arena::new();
        let root = comrak::parse_document(&arena, content, &options);

        let mut slugger = Slugger::new();
        let mut headings = Vec::new();

        let nodes: Vec<&AstNode<'_>> = root.descendants().collect();
        for node in nodes {
            let level = match &node.data.borrow().value {
                NodeValue::Heading(heading) => Some(heading.level),
                _ => None,
            };
            if let Some(level) = level {
                let heading = rewrite_heading(node, level, &mut slugger, &options)?;
                headings.push(heading);
                continue;
            }

            let block = match &node.data.borrow().value {
                NodeValue::CodeBlock(block) => Some((block.info.clone(), block.literal.clone())),
                _ => None,
            };
            if let Some((info, literal)) = block {
                let html = code_block::render(self.highlighter, &info, &literal);
                replace_with_html(node, html);
            }
        }

        let mut buffer = Vec::with_capacity(content.len() * 2);
        comrak::format_html(root, &options, &mut buffer).context("Failed to format HTML")?;
        let html = String::from_utf8(buffer).context("Rendered HTML is not valid UTF8")?;

        let html = if self.sanitize {
            sanitize::clean(&html)
        } else {
            html
        };

        Ok(RenderedDocument { html, headings })
    }

    /// Renders markdown file at given path.
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or rendering fails
    pub fn render_file(&self, path: impl AsRef<Path>) -> Result<RenderedDocument> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read markdown file: {}", path.display()))?;
        self.render_document(&content)
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders markdown to sanitized HTML, never failing.
///
/// Pages call this directly with article bodies, profile text and editor
/// content. A document that cannot be rendered, including one that makes
/// the parser panic, yields an empty string so a single bad document never
/// takes down the page rendering it.
///
/// # Examples
///
/// ```
/// use markpress::render_markdown;
///
/// let html = render_markdown("## Setup\n\n## Setup\n");
/// assert!(html.contains("id=\"setup\""));
/// assert!(html.contains("id=\"setup-2\""));
/// assert_eq!(render_markdown(""), "");
/// ```
pub fn render_markdown(markdown: &str) -> String {
    let renderer = MarkdownRenderer::new();

    match panic::catch_unwind(AssertUnwindSafe(|| renderer.render(markdown))) {
        Ok(Ok(html)) => html,
        Ok(Err(e)) => {
            warn!("Markdown rendering failed, returning empty output: {:#}", e);
            String::new()
        }
        Err(_) => {
            warn!("Markdown parser panicked, returning empty output");
            String::new()
        }
    }
}

/// Parser and formatter options shared by every render call.
///
/// Raw HTML rendering is enabled at the formatter level because rewritten
/// headings and code blocks are spliced in as HTML blocks; untrusted output
/// is sanitized afterwards instead.
fn parser_options() -> Options<'static> {
    let mut options = Options::default();

    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.footnotes = true;

    options.parse.smart = true;

    options.render.unsafe_ = true;

    options
}

/// Replaces a heading node with its anchored HTML and returns its outline entry.
fn rewrite_heading<'a>(
    node: &'a AstNode<'a>,
    level: u8,
    slugger: &mut Slugger,
    options: &Options,
) -> Result<Heading> {
    let text = collect_heading_text(node);
    let id = slugger.anchor_for(&text);

    let children: Vec<&AstNode<'_>> = node.children().collect();
    let mut inner = Vec::new();
    for &child in &children {
        comrak::format_html(child, options, &mut inner).context("Failed to format heading")?;
    }
    let inner = String::from_utf8(inner).context("Heading HTML is not valid UTF8")?;

    for child in children {
        child.detach();
    }

    let html = format!(
        "<h{level} id=\"{}\" class=\"{HEADING_CLASS}\">{}</h{level}>\n",
        escape_html(&id),
        inner.trim_end()
    );
    replace_with_html(node, html);

    Ok(Heading { level, id, text })
}

/// Collects plain text of a heading, dropping inline markup.
fn collect_heading_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut text = String::new();

    for descendant in node.descendants().skip(1) {
        match &descendant.data.borrow().value {
            NodeValue::Text(literal) => text.push_str(literal),
            NodeValue::Code(code) => text.push_str(&code.literal),
            NodeValue::SoftBreak | NodeValue::LineBreak => text.push(' '),
            _ => {}
        }
    }

    text.trim().to_string()
}

/// Estimates the deepest container nesting of any line.
///
/// Counts blockquote and list markers at the start of a line, plus one
/// level per two columns of leading indentation, which covers both
/// `> > >` chains and lists nested by indenting.
fn nesting_depth(content: &str) -> usize {
    content.lines().map(line_depth).max().unwrap_or(0)
}

fn line_depth(line: &str) -> usize {
    let content = line.trim_start_matches([' ', '\t']);
    let columns: usize = line[..line.len() - content.len()]
        .chars()
        .map(|c| if c == '\t' { 4 } else { 1 })
        .sum();

    let mut markers = 0;
    let mut rest = content;
    loop {
        if let Some(after) = rest.strip_prefix('>') {
            rest = after.trim_start_matches([' ', '\t']);
        } else if let Some(after) = strip_list_marker(rest) {
            rest = after.trim_start_matches([' ', '\t']);
        } else {
            break;
        }
        markers += 1;
    }

    markers + columns / 2
}

/// Strips a bullet or ordered list marker followed by whitespace.
fn strip_list_marker(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();

    let marker_len = match (digits, bytes.get(digits).copied()) {
        (0, Some(b'-' | b'*' | b'+')) => 1,
        (1..=9, Some(b'.' | b')')) => digits + 1,
        _ => return None,
    };

    let after = &text[marker_len..];
    after.starts_with([' ', '\t']).then_some(after)
}

fn replace_with_html(node: &AstNode<'_>, html: String) {
    let mut data = node.data.borrow_mut();
    data.value = NodeValue::HtmlBlock(NodeHtmlBlock {
        block_type: 0,
        literal: html,
    });
}
