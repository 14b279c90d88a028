//! HTML sanitizing policy for rendered Markdown.

use ammonia::Builder;

/// Builds the sanitizer applied to untrusted Markdown output.
///
/// Starts from ammonia's defaults (scripts, styles and event handlers are
/// dropped) and allows the structure the renderer itself emits: heading
/// ids and classes, `data-*` attributes used by the clipboard handler and
/// footnotes, the copy `button`, and disabled task list checkboxes.
pub(crate) fn sanitizer() -> Builder<'static> {
    let mut builder = Builder::default();

    builder
        .add_tags(&["button", "input", "section", "del", "s", "sup", "sub"])
        .add_generic_attributes(&["id", "class", "aria-hidden", "aria-label", "role"])
        .add_generic_attribute_prefixes(&["data-"])
        .add_tag_attributes("button", &["type"])
        .add_tag_attributes("input", &["type", "checked", "disabled"])
        .add_tag_attributes("ol", &["start"]);

    builder
}

/// Sanitizes an HTML fragment with [`sanitizer`].
pub(crate) fn clean(html: &str) -> String {
    sanitizer().clean(html).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_strips_script() {
        // Arrange
        let html = "<p>ok</p><script>alert(1)</script>";

        // Act
        let cleaned = clean(html);

        // Assert
        assert!(!cleaned.contains("<script"), "{}", cleaned);
        assert!(cleaned.contains("<p>ok</p>"));
    }

    #[test]
    fn test_clean_strips_event_handlers() {
        // Act
        let cleaned = clean("<img src=\"a.png\" onerror=\"alert(1)\">");

        // Assert
        assert!(!cleaned.contains("onerror"), "{}", cleaned);
        assert!(cleaned.contains("a.png"));
    }

    #[test]
    fn test_clean_keeps_heading_anchor() {
        // Act
        let cleaned = clean("<h2 id=\"setup\" class=\"scroll-mt-24\">Setup</h2>");

        // Assert
        assert!(cleaned.contains("id=\"setup\""), "{}", cleaned);
        assert!(cleaned.contains("class=\"scroll-mt-24\""), "{}", cleaned);
    }

    #[test]
    fn test_clean_keeps_copy_button() {
        // Arrange
        let html = "<div class=\"code-block\" data-lang=\"rust\"><button type=\"button\" data-code-copy=\"true\">Copy</button><pre><code class=\"hljs\">x</code></pre></div>";

        // Act
        let cleaned = clean(html);

        // Assert
        assert!(cleaned.contains("data-code-copy=\"true\""), "{}", cleaned);
        assert!(cleaned.contains("data-lang=\"rust\""), "{}", cleaned);
        assert!(cleaned.contains("<button type=\"button\""), "{}", cleaned);
    }
}
