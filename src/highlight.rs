//! Syntax highlighting with syntect.
//!
//! Wraps the extended syntect grammar bundle (syntect defaults plus the
//! two-face collection) behind a small API: explicit highlighting for a
//! declared language, and relevance based autodetection when the language
//! is missing or unknown.

use anyhow::{Context, Result};
use serde_json::Value;
use std::sync::LazyLock;
use syntect::highlighting::ThemeSet;
use syntect::html::{ClassStyle, ClassedHTMLGenerator, css_for_theme_with_class_style};
use syntect::parsing::{ParseState, ScopeStackOp, SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use crate::util::escape_html;

/// CSS class style for highlighted spans.
///
/// Emits `hljs-` prefixed class names so stylesheets written for
/// highlight.js markup keep working.
pub const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed { prefix: "hljs-" };

/// Maximum number of lines inspected during language detection.
const DETECTION_LINE_LIMIT: usize = 120;

/// Characters that almost every code snippet contains and prose rarely does.
const CODE_PUNCTUATION: &[char] = &[
    '{', '}', '(', ')', '[', ']', ';', '=', '<', '>', '$', '#', '@', '/', '\\', '"', '|', '&',
    '*', ':',
];

/// Language tokens that syntect does not know under the same name.
const ALIASES: &[(&str, &str)] = &[
    ("shell", "sh"),
    ("zsh", "sh"),
    ("console", "sh"),
    ("shellsession", "sh"),
    ("golang", "go"),
    ("yml", "yaml"),
    ("c++", "cpp"),
    ("csharp", "cs"),
    ("c#", "cs"),
    ("typescript", "ts"),
    ("javascript", "js"),
    ("node", "js"),
    ("py3", "py"),
    ("rb", "ruby"),
    ("docker", "dockerfile"),
    ("patch", "diff"),
];

/// Tokens highlighted as plain text.
const PLAIN_TEXT: &[&str] = &["text", "plaintext", "plain", "txt"];

/// Autodetection candidates as `(display label, syntect token)`.
///
/// Order matters: on equal relevance the earlier candidate wins.
const CANDIDATES: &[(&str, &str)] = &[
    ("rust", "rs"),
    ("python", "py"),
    ("typescript", "ts"),
    ("javascript", "js"),
    ("go", "go"),
    ("java", "java"),
    ("cpp", "cpp"),
    ("c", "c"),
    ("csharp", "cs"),
    ("php", "php"),
    ("ruby", "rb"),
    ("bash", "sh"),
    ("sql", "sql"),
    ("json", "json"),
    ("yaml", "yaml"),
    ("toml", "toml"),
    ("html", "html"),
    ("xml", "xml"),
    ("css", "css"),
    ("diff", "diff"),
];

static SHARED: LazyLock<Highlighter> = LazyLock::new(Highlighter::new);

/// Result of highlighting with autodetection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlighted {
    /// Highlighted, HTML escaped markup.
    pub html: String,
    /// Detected language label, if any candidate matched.
    pub language: Option<&'static str>,
}

/// Syntax highlighter backed by an immutable syntect grammar set.
pub struct Highlighter {
    syntax_set: SyntaxSet,
}

impl Highlighter {
    /// Loads the extended grammar set.
    ///
    /// Loading takes a few milliseconds; prefer [`Highlighter::shared`]
    /// unless an isolated instance is needed.
    pub fn new() -> Self {
        Self {
            syntax_set: two_face::syntax::extra_newlines(),
        }
    }

    /// Returns the process wide highlighter.
    ///
    /// The grammar set is read only, so sharing it across threads and
    /// render calls is safe.
    pub fn shared() -> &'static Highlighter {
        &SHARED
    }

    /// Returns true when the normalized language token maps to a grammar.
    pub fn supports(&self, language: &str) -> bool {
        self.find_syntax(language).is_some()
    }

    /// Highlights code using the declared language.
    ///
    /// Unknown languages produce HTML escaped plain text; callers that want
    /// detection for unknown tokens check [`Highlighter::supports`] first.
    ///
    /// # Errors
    ///
    /// Returns error if syntect fails to parse a line with the grammar.
    pub fn highlight(&self, code: &str, language: &str) -> Result<String> {
        match self.find_syntax(language) {
            Some(syntax) => self.highlight_with(code, syntax),
            None => Ok(escape_html(code)),
        }
    }

    /// Highlights code after guessing its language.
    ///
    /// # Errors
    ///
    /// Returns error if syntect fails to parse a line with the detected
    /// grammar.
    pub fn highlight_auto(&self, code: &str) -> Result<Highlighted> {
        let Some(language) = self.detect(code) else {
            return Ok(Highlighted {
                html: escape_html(code),
                language: None,
            });
        };

        let html = self.highlight(code, language)?;
        Ok(Highlighted {
            html,
            language: Some(language),
        })
    }

    /// Guesses the language of a code snippet.
    ///
    /// JSON documents and markup are recognized by shape first. Otherwise
    /// the snippet is parsed with every candidate grammar and the scopes
    /// each one assigns are scored: keywords and storage modifiers weigh
    /// the most, named types and language constants less, and `invalid`
    /// scopes count against the grammar. A grammar that never recognizes
    /// a keyword is not a match. Text without any code punctuation is
    /// treated as prose and yields `None`.
    pub fn detect(&self, code: &str) -> Option<&'static str> {
        let trimmed = code.trim();
        if trimmed.is_empty() {
            return None;
        }

        if let Some(label) = detect_by_shape(trimmed) {
            return Some(label);
        }

        if !trimmed.contains(CODE_PUNCTUATION) {
            return None;
        }

        let mut best: Option<(&'static str, i64)> = None;

        for &(label, token) in CANDIDATES {
            let Some(syntax) = self.find_syntax(token) else {
                continue;
            };
            let Some(relevance) = self.relevance(code, syntax) else {
                continue;
            };
            if !relevance.is_confident() {
                continue;
            }

            if best.is_none_or(|(_, top)| relevance.score > top) {
                best = Some((label, relevance.score));
            }
        }

        best.map(|(label, _)| label)
    }

    /// Scores how well a grammar fits the code, or `None` if it fails.
    fn relevance(&self, code: &str, syntax: &SyntaxReference) -> Option<Relevance> {
        let mut state = ParseState::new(syntax);
        let mut relevance = Relevance::default();

        for line in LinesWithEndings::from(code).take(DETECTION_LINE_LIMIT) {
            let ops = state.parse_line(line, &self.syntax_set).ok()?;
            for (_, op) in ops {
                if let ScopeStackOp::Push(scope) = op {
                    relevance.add(scope_weight(&scope.build_string()));
                }
            }
        }

        Some(relevance)
    }

    fn highlight_with(&self, code: &str, syntax: &SyntaxReference) -> Result<String> {
        if code.is_empty() {
            return Ok(String::new());
        }

        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &self.syntax_set, CLASS_STYLE);

        for line in LinesWithEndings::from(code) {
            generator
                .parse_html_for_line_which_includes_newline(line)
                .with_context(|| format!("Failed to highlight line as {}", syntax.name))?;
        }

        Ok(generator.finalize())
    }

    fn find_syntax(&self, language: &str) -> Option<&SyntaxReference> {
        if language.is_empty() {
            return None;
        }

        if PLAIN_TEXT.contains(&language) {
            return Some(self.syntax_set.find_syntax_plain_text());
        }

        let token = ALIASES
            .iter()
            .find(|(alias, _)| *alias == language)
            .map_or(language, |(_, target)| *target);

        self.syntax_set
            .find_syntax_by_token(token)
            .or_else(|| self.syntax_set.find_syntax_by_extension(token))
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

/// Minimum score a grammar needs to count as detected.
const MIN_RELEVANCE: i64 = 2;

/// Weight of scopes that only a real keyword produces.
const KEYWORD_WEIGHT: i64 = 2;

/// Accumulated detection score of one grammar.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Relevance {
    score: i64,
    keywords: usize,
}

impl Relevance {
    fn add(&mut self, weight: i64) {
        self.score += weight;
        if weight == KEYWORD_WEIGHT {
            self.keywords += 1;
        }
    }

    fn is_confident(&self) -> bool {
        self.keywords > 0 && self.score >= MIN_RELEVANCE
    }
}

/// Relevance weight of a pushed scope name.
///
/// Function names score nothing: several C family grammars read any bare
/// identifier as a function declaration.
fn scope_weight(scope: &str) -> i64 {
    if scope.starts_with("invalid") {
        -3
    } else if scope.starts_with("keyword.operator") || scope.starts_with("entity.name.function") {
        0
    } else if scope.starts_with("keyword") || scope.starts_with("storage") {
        KEYWORD_WEIGHT
    } else if scope.starts_with("entity.name")
        || scope.starts_with("support")
        || scope.starts_with("variable.language")
        || scope.starts_with("constant.language")
    {
        1
    } else {
        0
    }
}

/// Recognizes JSON documents and markup without grammar scoring.
///
/// Expects trimmed, non empty code.
fn detect_by_shape(code: &str) -> Option<&'static str> {
    match *code.as_bytes().first()? {
        b'{' | b'[' if serde_json::from_str::<Value>(code).is_ok() => Some("json"),
        b'<' if code.ends_with('>') => {
            if code.starts_with("<?xml") {
                Some("xml")
            } else if code.starts_with("<?php") {
                Some("php")
            } else {
                Some("html")
            }
        }
        _ => None,
    }
}

/// Generates CSS for a bundled syntect theme using [`CLASS_STYLE`].
///
/// # Errors
///
/// Returns error if the theme name is unknown or CSS generation fails.
pub fn theme_css(theme: &str) -> Result<String> {
    let themes = ThemeSet::load_defaults();
    let theme = themes
        .themes
        .get(theme)
        .with_context(|| format!("Unknown highlighting theme: {}", theme))?;

    css_for_theme_with_class_style(theme, CLASS_STYLE).context("Failed to generate theme CSS")
}

/// Returns the names of the bundled highlighting themes.
pub fn theme_names() -> Vec<String> {
    let mut names: Vec<String> = ThemeSet::load_defaults().themes.into_keys().collect();
    names.sort();
    names
}
