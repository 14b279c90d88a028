//! Shared test utilities for integration tests.
//!
//! Provides helpers for writing markdown fixtures and for inspecting the
//! code block containers in rendered HTML.

#![allow(dead_code)]

use anyhow::Result;
use std::path::{Path, PathBuf};

/// Markdown document touching every construct the renderer rewrites.
pub const SAMPLE_POST: &str = r#"# Building a Blog

Intro paragraph with a [link](https://example.com).

## Setup

```ts
const answer: number = 42;
```

## Setup

```
fn main() {
    let x = 5;
}
```

### 安装步骤

- [x] done
- [ ] todo

## Hello, World!
"#;

/// Writes a markdown file into a directory, creating parent directories.
///
/// # Errors
///
/// Returns error if directory creation or file write fails
pub fn write_markdown(dir: &Path, name: &str, content: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, content)?;
    Ok(path)
}

/// Splits rendered HTML into one slice per `.code-block` container.
///
/// Highlighted code is escaped, so the container marker cannot appear
/// inside a block's own content.
pub fn code_blocks(html: &str) -> Vec<&str> {
    const MARKER: &str = "<div class=\"code-block\"";

    let starts: Vec<usize> = html.match_indices(MARKER).map(|(i, _)| i).collect();
    starts
        .iter()
        .enumerate()
        .map(|(n, &start)| {
            let end = starts.get(n + 1).copied().unwrap_or(html.len());
            &html[start..end]
        })
        .collect()
}

/// Extracts the value of `data-lang` from a code block container.
pub fn block_label(block: &str) -> Option<&str> {
    let start = block.find("data-lang=\"")? + "data-lang=\"".len();
    let end = block[start..].find('"')? + start;
    Some(&block[start..end])
}
