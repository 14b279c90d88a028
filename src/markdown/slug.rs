//! Heading slug normalization and per-document de-duplication.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Matches runs of characters that are not Unicode word characters.
///
/// `\w` is Unicode aware here, so CJK ideographs, accented letters and
/// digits survive while punctuation, whitespace and hyphens collapse.
static NON_WORD_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\W+").unwrap());

/// Normalizes heading text into a URL safe anchor slug.
///
/// Trims and lowercases the input, replaces every run of non word
/// characters with a single hyphen, and strips hyphens from both ends.
/// Headings made entirely of punctuation produce an empty slug.
///
/// Anchor ids derived from this function are referenced by bookmarked
/// links and the table of contents, so the normalization rule must not
/// change.
///
/// # Examples
///
/// ```
/// use markpress::slugify;
///
/// assert_eq!(slugify("Hello, World!"), "hello-world");
/// assert_eq!(slugify("安装步骤"), "安装步骤");
/// ```
pub fn slugify(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    let replaced = NON_WORD_RUN.replace_all(&lowered, "-");
    replaced.trim_matches('-').to_string()
}

/// Assigns unique anchor ids within a single rendered document.
///
/// The first heading with a given base slug keeps the bare slug; later
/// headings with the same base get `-2`, `-3`, and so on. A slugger is
/// created per render call and dropped with it.
#[derive(Debug, Default)]
pub struct Slugger {
    occurrences: HashMap<String, usize>,
}

impl Slugger {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the anchor id for the given heading text.
    ///
    /// Only base slugs are counted. A heading whose own text ends in a
    /// suffix, such as `A-2`, can therefore repeat a generated id; anchors
    /// already published depend on this numbering.
    pub fn anchor_for(&mut self, heading: &str) -> String {
        let base = slugify(heading);
        let count = self.occurrences.entry(base.clone()).or_insert(0);
        *count += 1;

        if *count == 1 {
            base
        } else {
            format!("{}-{}", base, count)
        }
    }
}
