//! Command line configuration.

use anyhow::{Result, anyhow, bail};
use chrono_tz::Tz;
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};

use crate::highlight::theme_names;

/// Path value meaning standard input.
const STDIN: &str = "-";

/// Output format of the rendered document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// HTML fragment, or a full page with `--standalone`
    Html,
    /// Response envelope with HTML, headings and metadata
    Json,
}

/// Command line configuration for Markpress.
#[derive(Debug, Clone, Parser)]
#[command(name = "markpress", version, about, long_about = None)]
pub struct Config {
    /// Markdown file to render, `-` for standard input
    #[arg(default_value = STDIN)]
    pub input: PathBuf,

    /// Output file, standard output when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "html")]
    pub format: OutputFormat,

    /// Wrap HTML output in a standalone preview page
    #[arg(long)]
    pub standalone: bool,

    /// Pass raw HTML in the source through without sanitizing
    #[arg(long)]
    pub trusted: bool,

    /// Print the article outline instead of HTML (html format only)
    #[arg(long)]
    pub toc: bool,

    /// Page title for standalone output
    #[arg(long)]
    pub title: Option<String>,

    /// Syntax highlighting theme (InspiredGitHub, base16-ocean.dark, etc.)
    #[arg(long, default_value = "InspiredGitHub")]
    pub theme: String,

    /// Write the markdown stylesheet for the theme to this path
    #[arg(long)]
    pub css: Option<PathBuf>,

    /// Time zone for formatted timestamps
    #[arg(long, default_value = "Asia/Shanghai")]
    pub timezone: String,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parses configuration from command line arguments.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Validates configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the input file does not exist, the time zone or
    /// theme name is unknown, or `--toc` or `--standalone` is combined with
    /// JSON output, which already carries the outline.
    pub fn validate(&self) -> Result<()> {
        if !self.reads_stdin() && !self.input.exists() {
            bail!("Input file does not exist: {}", self.input.display());
        }

        if self.format == OutputFormat::Json {
            if self.toc {
                bail!("--toc cannot be combined with --format json; the payload has a toc field");
            }
            if self.standalone {
                bail!("--standalone only applies to --format html");
            }
        }

        self.timezone()?;

        if !theme_names().iter().any(|name| name == &self.theme) {
            bail!(
                "Unknown highlighting theme: {} (available: {})",
                self.theme,
                theme_names().join(", ")
            );
        }

        Ok(())
    }

    /// Returns true when markdown is read from standard input.
    pub fn reads_stdin(&self) -> bool {
        self.input == Path::new(STDIN)
    }

    /// Parses the configured time zone.
    ///
    /// # Errors
    ///
    /// Returns error if the name is not an IANA time zone.
    pub fn timezone(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| anyhow!("Unknown time zone {}: {}", self.timezone, e))
    }

    /// Returns page title from configuration or the input file name.
    pub fn page_title(&self) -> String {
        if let Some(title) = &self.title {
            return title.clone();
        }

        if self.reads_stdin() {
            return "Preview".to_string();
        }

        self.input
            .file_stem()
            .and_then(|stem| stem.to_str())
            .map(String::from)
            .unwrap_or_else(|| "Preview".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(input: &str) -> Config {
        Config {
            input: PathBuf::from(input),
            output: None,
            format: OutputFormat::Html,
            standalone: false,
            trusted: false,
            toc: false,
            title: None,
            theme: "InspiredGitHub".to_string(),
            css: None,
            timezone: "Asia/Shanghai".to_string(),
            verbose: false,
        }
    }

    #[test]
    fn test_defaults_from_args() {
        // Act
        let config = Config::try_parse_from(["markpress"]).expect("Should parse");

        // Assert
        assert!(config.reads_stdin());
        assert_eq!(config.format, OutputFormat::Html);
        assert_eq!(config.theme, "InspiredGitHub");
        assert_eq!(config.timezone, "Asia/Shanghai");
    }

    #[test]
    fn test_json_format_from_args() {
        // Act
        let config =
            Config::try_parse_from(["markpress", "post.md", "--format", "json", "-o", "post.json"])
                .expect("Should parse");

        // Assert
        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(config.output, Some(PathBuf::from("post.json")));
        assert_eq!(config.input, PathBuf::from("post.md"));
    }

    #[test]
    fn test_validate_stdin() {
        assert!(config("-").validate().is_ok());
    }

    #[test]
    fn test_validate_missing_input() {
        // Act
        let result = config("/nonexistent/post.md").validate();

        // Assert
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_unknown_timezone() {
        // Arrange
        let mut config = config("-");
        config.timezone = "Mars/Olympus".to_string();

        // Act & Assert
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_unknown_theme() {
        // Arrange
        let mut config = config("-");
        config.theme = "Nope".to_string();

        // Act & Assert
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_toc_with_json() {
        // Arrange
        let mut config = config("-");
        config.format = OutputFormat::Json;
        config.toc = true;

        // Act
        let result = config.validate();

        // Assert
        let message = format!("{:#}", result.expect_err("Should reject --toc with json"));
        assert!(message.contains("--toc"), "{}", message);
    }

    #[test]
    fn test_validate_standalone_with_json() {
        // Arrange
        let mut config = config("-");
        config.format = OutputFormat::Json;
        config.standalone = true;

        // Act & Assert
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_toc_with_html() {
        // Arrange
        let mut config = config("-");
        config.toc = true;

        // Act & Assert
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_page_title() {
        assert_eq!(config("-").page_title(), "Preview");
        assert_eq!(config("posts/hello-world.md").page_title(), "hello-world");

        let mut explicit = config("post.md");
        explicit.title = Some("Draft".to_string());
        assert_eq!(explicit.page_title(), "Draft");
    }
}
