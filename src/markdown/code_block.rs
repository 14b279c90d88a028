//! Code block markup with language label and copy trigger.

use maud::{PreEscaped, html};
use tracing::debug;

use crate::highlight::Highlighter;
use crate::util::escape_html;

/// Label shown when no language could be resolved.
pub const PLAIN_LABEL: &str = "text";

/// Text of the copy trigger before the clipboard handler swaps it.
pub const COPY_LABEL: &str = "Copy";

/// Normalizes a fenced code block info string to a language token.
///
/// Trims and lowercases the info string, strips a leading `language-`
/// prefix, and keeps only the first whitespace delimited word so that
/// trailing metadata (`ts title="app.ts"`) is ignored.
pub fn normalize_language(info: &str) -> String {
    let lowered = info.trim().to_lowercase();
    let stripped = lowered.strip_prefix("language-").unwrap_or(&lowered);
    stripped
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Renders one code block as a self contained, copyable container.
///
/// The emitted structure is a contract with the page level clipboard
/// handler: one `.code-block` container holding exactly one
/// `[data-code-copy="true"]` trigger and exactly one `pre > code`.
///
/// A recognized declared language is highlighted explicitly and used as
/// the label. Anything else falls back to autodetection; the label is then
/// the detected language or [`PLAIN_LABEL`]. The `language-*` class always
/// reflects the declared token, recognized or not.
pub fn render(highlighter: &Highlighter, info: &str, code: &str) -> String {
    let declared = normalize_language(info);
    let (highlighted, label) = highlight_block(highlighter, &declared, code);

    let code_class = if declared.is_empty() {
        "hljs".to_string()
    } else {
        format!("hljs language-{}", declared)
    };

    let markup = html! {
        div class="code-block" data-lang=(label) {
            div class="code-block-header" {
                span class="code-block-lang" { (label) }
                button type="button" class="code-block-copy" data-code-copy="true" { (COPY_LABEL) }
            }
            pre { code class=(code_class) { (PreEscaped(highlighted)) } }
        }
    };

    let mut block = markup.into_string();
    block.push('\n');
    block
}

/// Highlights code, returning the markup and the resolved display label.
fn highlight_block(highlighter: &Highlighter, declared: &str, code: &str) -> (String, String) {
    if highlighter.supports(declared) {
        match highlighter.highlight(code, declared) {
            Ok(html) => return (html, declared.to_string()),
            Err(e) => debug!(
                language = declared,
                "Highlighting failed, falling back to detection: {:#}", e
            ),
        }
    } else if !declared.is_empty() {
        debug!(language = declared, "Unrecognized code block language");
    }

    match highlighter.highlight_auto(code) {
        Ok(highlighted) => (
            highlighted.html,
            highlighted.language.unwrap_or(PLAIN_LABEL).to_string(),
        ),
        Err(e) => {
            debug!("Autodetected highlighting failed, using plain text: {:#}", e);
            (escape_html(code), PLAIN_LABEL.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_language_plain() {
        assert_eq!(normalize_language("ts"), "ts");
        assert_eq!(normalize_language("  Rust  "), "rust");
    }

    #[test]
    fn test_normalize_language_prefix_and_metadata() {
        assert_eq!(normalize_language("language-Python"), "python");
        assert_eq!(normalize_language("ts title=\"app.ts\""), "ts");
        assert_eq!(normalize_language("language-js {1,3}"), "js");
    }

    #[test]
    fn test_normalize_language_empty() {
        assert_eq!(normalize_language(""), "");
        assert_eq!(normalize_language("   "), "");
    }

    #[test]
    fn test_render_declared_language() {
        // Arrange
        let highlighter = Highlighter::shared();

        // Act
        let html = render(highlighter, "ts", "const x: number = 1;\n");

        // Assert
        assert!(html.contains("data-lang=\"ts\""), "Container label: {}", html);
        assert!(
            html.contains("<span class=\"code-block-lang\">ts</span>"),
            "Visible label: {}",
            html
        );
        assert!(
            html.contains("<code class=\"hljs language-ts\">"),
            "Code class: {}",
            html
        );
    }

    #[test]
    fn test_render_without_language() {
        // Arrange
        let highlighter = Highlighter::shared();

        // Act
        let html = render(highlighter, "", "just some words\n");

        // Assert
        assert!(html.contains("<code class=\"hljs\">"), "Code class: {}", html);
        assert!(html.contains("just some words"));
    }

    #[test]
    fn test_render_unknown_language_keeps_class() {
        // Arrange
        let highlighter = Highlighter::shared();

        // Act
        let html = render(highlighter, "unknownlang", "some code\n");

        // Assert
        assert!(
            html.contains("<code class=\"hljs language-unknownlang\">"),
            "Declared token stays in class: {}",
            html
        );
        assert!(
            html.contains("data-lang=\"text\""),
            "Prose is not detected as code: {}",
            html
        );
    }

    #[test]
    fn test_render_copy_trigger_structure() {
        // Arrange
        let highlighter = Highlighter::shared();

        // Act
        let html = render(highlighter, "rust", "fn main() {}\n");

        // Assert
        assert_eq!(html.matches("data-code-copy=\"true\"").count(), 1);
        assert_eq!(html.matches("<pre><code").count(), 1);
        assert!(html.contains("type=\"button\""));
        assert!(html.contains(COPY_LABEL));
    }

    #[test]
    fn test_render_plain_text_declared() {
        // Arrange
        let highlighter = Highlighter::shared();

        // Act
        let html = render(highlighter, "text", "a < b\n");

        // Assert
        assert!(html.contains("data-lang=\"text\""), "{}", html);
        assert!(html.contains("a &lt; b"), "Should escape: {}", html);
    }
}
