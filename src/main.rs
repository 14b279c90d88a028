use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use markpress::components::layout::preview_page;
use markpress::envelope::DEFAULT_TIME_FIELDS;
use markpress::{
    ApiResponse, Config, ErrorResponse, Heading, MarkdownRenderer, OutputFormat, TocEntry,
    estimate_reading_time, format_timestamps, stylesheet, toc, write_css_assets,
};
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::{MAIN_SEPARATOR, Path, PathBuf};
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// File name written by `write_css_assets` when `--css` names a directory.
const STYLESHEET_NAME: &str = "markdown.css";

/// Payload of the JSON envelope.
#[derive(Serialize)]
struct RenderPayload<'a> {
    html: &'a str,
    headings: &'a [Heading],
    toc: Vec<TocEntry>,
    reading_time: usize,
    updated_at: Option<String>,
}

/// Installs the stderr log subscriber.
///
/// `RUST_LOG` overrides the default level, which is `warn`, or `debug`
/// with `--verbose`.
fn init_tracing(verbose: bool) -> Result<()> {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .compact()
        .try_init()
        .map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))
}

/// Reads markdown from the input file or standard input.
fn read_source(config: &Config) -> Result<String> {
    if config.reads_stdin() {
        return io::read_to_string(io::stdin()).context("Failed to read standard input");
    }

    fs::read_to_string(&config.input)
        .with_context(|| format!("Failed to read {}", config.input.display()))
}

/// Returns the input file's modification time as RFC 3339.
fn modified_at(config: &Config) -> Option<String> {
    if config.reads_stdin() {
        return None;
    }

    let modified = fs::metadata(&config.input).ok()?.modified().ok()?;
    Some(DateTime::<Utc>::from(modified).to_rfc3339())
}

/// Renders the outline as a nested markdown list.
fn format_outline(entries: &[TocEntry]) -> String {
    let min_level = entries.iter().map(|e| e.level).min().unwrap_or(2);

    entries
        .iter()
        .map(|entry| {
            let indent = "  ".repeat(usize::from(entry.level - min_level));
            format!("{}- [{}](#{})\n", indent, entry.text, entry.id)
        })
        .collect()
}

fn render_html(config: &Config, renderer: &MarkdownRenderer, source: &str) -> Result<String> {
    let document = renderer
        .render_document(source)
        .context("Failed to render markdown")?;

    if config.toc {
        return Ok(format_outline(&toc::article_outline(&document.headings)));
    }

    if !config.standalone {
        return Ok(document.html);
    }

    let css_href = config
        .css
        .as_deref()
        .map(|path| stylesheet_path(path).display().to_string());
    let stylesheets: Vec<&str> = css_href.iter().map(String::as_str).collect();
    let page = preview_page(&config.page_title(), &stylesheets, &document.html);

    Ok(page.into_string())
}

fn render_json(config: &Config, renderer: &MarkdownRenderer, source: &str) -> Result<String> {
    let tz = config.timezone()?;

    let body = match renderer.render_document(source) {
        Ok(document) => {
            let payload = RenderPayload {
                html: &document.html,
                headings: &document.headings,
                toc: toc::article_outline(&document.headings),
                reading_time: estimate_reading_time(source),
                updated_at: modified_at(config),
            };
            let mut data = serde_json::to_value(&payload).context("Failed to encode payload")?;
            format_timestamps(&mut data, DEFAULT_TIME_FIELDS, tz);
            serde_json::to_string_pretty(&ApiResponse::ok(data))
        }
        Err(e) => {
            serde_json::to_string_pretty(&ErrorResponse::internal(format!("{:#}", e)))
        }
    };

    body.context("Failed to encode response")
}

fn write_output(config: &Config, output: &str) -> Result<()> {
    match &config.output {
        Some(path) => {
            fs::write(path, output)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Generated: {}", path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(output.as_bytes())
                .context("Failed to write standard output")?;
            stdout.flush().context("Failed to flush standard output")?;
        }
    }

    Ok(())
}

/// Returns true when `--css` names a directory, existing or not.
///
/// A trailing path separator marks a directory that may not exist yet.
fn names_directory(path: &Path) -> bool {
    path.is_dir() || path.as_os_str().to_string_lossy().ends_with(['/', MAIN_SEPARATOR])
}

/// Returns the stylesheet file written for the `--css` value.
fn stylesheet_path(path: &Path) -> PathBuf {
    if names_directory(path) {
        path.join(STYLESHEET_NAME)
    } else {
        path.to_path_buf()
    }
}

/// Writes the theme stylesheet into a directory or to an explicit file.
///
/// Missing directories are created.
fn write_stylesheet(path: &Path, theme: &str) -> Result<()> {
    if names_directory(path) {
        write_css_assets(path, theme)?;
        info!("Generated: {}", stylesheet_path(path).display());
        return Ok(());
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    fs::write(path, stylesheet(theme)?)
        .with_context(|| format!("Failed to write stylesheet {}", path.display()))?;
    info!("Generated: {}", path.display());
    Ok(())
}

fn main() -> Result<()> {
    let config = Config::parse();
    init_tracing(config.verbose)?;
    config.validate().context("Invalid configuration")?;

    if let Some(css) = &config.css {
        write_stylesheet(css, &config.theme)?;
    }

    let source = read_source(&config)?;
    let renderer = if config.trusted {
        MarkdownRenderer::trusted()
    } else {
        MarkdownRenderer::new()
    };

    let output = match config.format {
        OutputFormat::Html => render_html(&config, &renderer, &source)?,
        OutputFormat::Json => render_json(&config, &renderer, &source)?,
    };

    write_output(&config, &output)
}
