//! SEO metadata extraction and body cleanup
//!
//! The metadata pass asks the model for a fixed `Label: value` format and
//! parses it defensively: every label has a computed default, so a partial
//! or garbled response never fails generation. The same labels are also
//! stripped out of article bodies, where models like to leave them behind.

use once_cell::sync::Lazy;
use regex::Regex;

/// Parsed SEO metadata, all fields optional
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeoMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
}

static SEO_TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^[ \t]*(?:\*\*)?SEO Title(?:\*\*)?[ \t]*:[ \t]*(.+)$").unwrap());
static DESCRIPTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^[ \t]*(?:\*\*)?Meta Description(?:\*\*)?[ \t]*:[ \t]*(.+)$").unwrap());
static CATEGORY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^[ \t]*(?:\*\*)?Category(?:\*\*)?[ \t]*:[ \t]*(.+)$").unwrap());
static TAGS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^[ \t]*(?:\*\*)?Tags(?:\*\*)?[ \t]*:[ \t]*(.+)$").unwrap());

/// Full-line SEO artifacts removed from article bodies
static ARTIFACT_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^[ \t]*(?:\*\*)?(?:Meta Description|SEO Title|Tags|Category|Meta)(?:\*\*)?[ \t]*:.*$")
        .unwrap()
});

/// Runs of three or more newlines collapse to a single blank line
static BLANK_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Leading markdown heading (`# Title`)
static HEADING_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^#\s+(.+)$").unwrap());

/// Parse `Label: value` metadata from a model response.
///
/// Unmatched labels stay `None`/empty; the caller substitutes defaults.
pub fn parse_seo_metadata(text: &str) -> SeoMetadata {
    let capture = |re: &Regex| {
        re.captures(text)
            .map(|c| c[1].trim().trim_matches('"').to_string())
            .filter(|s| !s.is_empty())
    };

    let tags = capture(&TAGS_RE)
        .map(|line| {
            line.split(',')
                .map(|t| t.trim().trim_start_matches('#').to_lowercase())
                .filter(|t| !t.is_empty())
                .collect()
        })
        .unwrap_or_default();

    SeoMetadata {
        title: capture(&SEO_TITLE_RE),
        description: capture(&DESCRIPTION_RE),
        category: capture(&CATEGORY_RE).map(|c| c.to_lowercase()),
        tags,
    }
}

/// Remove full-line SEO artifacts from an article body and collapse the
/// resulting blank-line runs to at most one blank line.
pub fn strip_seo_artifacts(content: &str) -> String {
    let stripped = ARTIFACT_LINE_RE.replace_all(content, "");
    let collapsed = BLANK_RUN_RE.replace_all(&stripped, "\n\n");
    collapsed.trim().to_string()
}

/// Extract the display title from an article: first `# ` heading wins.
pub fn extract_title(content: &str) -> Option<String> {
    HEADING_RE
        .captures(content)
        .map(|c| c[1].trim().trim_matches('*').trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Derive a plain-text excerpt from markdown content.
///
/// Takes the first non-heading paragraph, drops inline markdown markers,
/// and truncates at a word boundary.
pub fn derive_excerpt(content: &str, max_len: usize) -> String {
    let paragraph = content
        .split("\n\n")
        .map(str::trim)
        .find(|p| !p.is_empty() && !p.starts_with('#'))
        .unwrap_or("");

    let plain: String = paragraph
        .replace(['*', '_', '`', '>'], "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    if plain.len() <= max_len {
        return plain;
    }

    let mut end = max_len;
    while !plain.is_char_boundary(end) {
        end -= 1;
    }
    let mut cut = &plain[..end];
    if let Some(space) = cut.rfind(' ') {
        cut = &cut[..space];
    }
    format!("{}…", cut.trim_end())
}
