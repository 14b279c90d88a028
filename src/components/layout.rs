//! Page layout wrapper component

use maud::{DOCTYPE, Markup, PreEscaped, html};

/// Click handler for code block copy triggers.
///
/// Looks up the `pre code` inside the trigger's `.code-block`, writes its
/// text to the clipboard, and swaps the trigger label for 1.5 seconds.
const COPY_SCRIPT: &str = r#"(() => {
  const timers = new Map();
  const flash = (btn, text) => {
    btn.dataset.label = btn.dataset.label || btn.textContent;
    btn.textContent = text;
    clearTimeout(timers.get(btn));
    timers.set(btn, setTimeout(() => { btn.textContent = btn.dataset.label; }, 1500));
  };
  document.addEventListener("click", async (event) => {
    const btn = event.target.closest("[data-code-copy='true']");
    if (!btn) return;
    const code = btn.closest(".code-block")?.querySelector("pre code");
    const text = code ? code.textContent : "";
    if (!text) return;
    try {
      await navigator.clipboard.writeText(text);
      flash(btn, "Copied");
    } catch {
      flash(btn, "Copy failed");
    }
  });
})();"#;

/// Wraps rendered markdown in a standalone preview document
///
/// The body is placed inside an `article.prose` container, the element
/// consuming pages style generic markdown output with. The copy handler
/// script is inlined so code block triggers work without the site shell.
///
/// # Arguments
///
/// * `title`: Page title text
/// * `stylesheets`: CSS file paths to include
/// * `body`: Rendered markdown HTML
///
/// # Returns
///
/// Complete HTML document with wrapped content
pub fn preview_page(title: &str, stylesheets: &[&str], body: &str) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                @for stylesheet in stylesheets {
                    link rel="stylesheet" href=(stylesheet);
                }
            }
            body {
                article class="prose" {
                    (PreEscaped(body))
                }
                script { (PreEscaped(COPY_SCRIPT)) }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_page_structure() {
        // Arrange
        let body = "<h2 id=\"intro\" class=\"scroll-mt-24\">Intro</h2>";

        // Act
        let page = preview_page("Draft", &["assets/markdown.css"], body).into_string();

        // Assert
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<title>Draft</title>"));
        assert!(page.contains("href=\"assets/markdown.css\""));
        assert!(page.contains("<article class=\"prose\"><h2 id=\"intro\""));
        assert!(page.contains("data-code-copy='true'"), "Copy handler inlined");
    }

    #[test]
    fn test_preview_page_escapes_title() {
        // Act
        let page = preview_page("<b>x</b>", &[], "").into_string();

        // Assert
        assert!(page.contains("&lt;b&gt;x&lt;/b&gt;"));
    }
}
