//! CSS asset bundling

use anyhow::{Context, Result};
use std::{fs, path::Path};

use crate::highlight::theme_css;

/// Structural styles for the code block container emitted by the renderer.
const CODE_BLOCK: &str = r#".code-block {
  margin: 1.25rem 0;
  border: 1px solid rgba(127, 127, 127, 0.25);
  border-radius: 0.5rem;
  overflow: hidden;
}
.code-block-header {
  display: flex;
  align-items: center;
  justify-content: space-between;
  padding: 0.25rem 0.75rem;
  font-size: 0.75rem;
  background: rgba(127, 127, 127, 0.08);
}
.code-block-lang {
  text-transform: lowercase;
  opacity: 0.7;
}
.code-block-copy {
  border: 0;
  background: transparent;
  cursor: pointer;
  font: inherit;
}
.code-block pre {
  margin: 0;
  padding: 0.75rem 1rem;
  overflow-x: auto;
}
.scroll-mt-24 {
  scroll-margin-top: 6rem;
}
"#;

/// Preview page layout around the `prose` container.
const PREVIEW: &str = r#"body {
  margin: 0;
  font-family: system-ui, -apple-system, "PingFang SC", "Microsoft YaHei", sans-serif;
  line-height: 1.7;
}
.prose {
  max-width: 48rem;
  margin: 2rem auto;
  padding: 0 1rem;
}
"#;

/// Returns the complete markdown stylesheet for a highlighting theme.
///
/// # Errors
///
/// Returns error if the theme is not bundled.
pub fn stylesheet(theme: &str) -> Result<String> {
    let highlighting = theme_css(theme)?;
    Ok([PREVIEW, CODE_BLOCK, highlighting.as_str()].join("\n"))
}

/// Writes `markdown.css` for the given theme to the assets directory
pub fn write_css_assets(assets_dir: &Path, theme: &str) -> Result<()> {
    fs::create_dir_all(assets_dir).context("Failed to create assets directory")?;
    write_bundled(assets_dir, "markdown.css", &stylesheet(theme)?)
}

fn write_bundled(dir: &Path, name: &str, css: &str) -> Result<()> {
    fs::write(dir.join(name), css)
        .with_context(|| format!("Failed to write CSS asset: {}", name))?;
    Ok(())
}
