//! Slug generation utilities
//!
//! Blog post slugs are date-prefixed kebab-case strings, unique across the
//! post store. Uniqueness is probed through a caller-supplied async check so
//! callers can hand in a database lookup or a test closure.

use chrono::{NaiveDate, Utc};
use std::future::Future;

/// Numbered-suffix attempts before falling back to a timestamp suffix.
const MAX_NUMBERED_ATTEMPTS: u32 = 100;

/// Convert arbitrary text to kebab-case.
///
/// Lowercases, drops non-alphanumeric characters, and collapses every run
/// of dropped characters (whitespace included) into a single hyphen. The
/// transform is idempotent: slugifying an already-valid slug returns it
/// unchanged.
pub fn slugify(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_separator = false;

    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_separator && !out.is_empty() {
                out.push('-');
            }
            pending_separator = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }

    out
}

/// Build the date-prefixed slug base: `{YYYY-MM-DD}-{kebab(title)}`
pub fn slug_base(title: &str, date: NaiveDate) -> String {
    let kebab = slugify(title);
    if kebab.is_empty() {
        format!("{}-post", date.format("%Y-%m-%d"))
    } else {
        format!("{}-{}", date.format("%Y-%m-%d"), kebab)
    }
}

/// Compute a slug unique against the store state reported by `exists`.
///
/// Probes the base slug, then `{base}-1`, `{base}-2`, ... up to
/// `MAX_NUMBERED_ATTEMPTS`. Past that the counter is abandoned and a
/// millisecond timestamp suffix guarantees termination.
///
/// The result is unique only as of the probe; the window between probe and
/// insert is closed by the store's UNIQUE constraint, not here.
pub async fn make_unique_slug<F, Fut, E>(
    title: &str,
    date: NaiveDate,
    exists: F,
) -> Result<String, E>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<bool, E>>,
{
    let base = slug_base(title, date);

    if !exists(base.clone()).await? {
        return Ok(base);
    }

    for n in 1..=MAX_NUMBERED_ATTEMPTS {
        let candidate = format!("{}-{}", base, n);
        if !exists(candidate.clone()).await? {
            return Ok(candidate);
        }
    }

    // Collision storm: stop probing and take a timestamp suffix.
    let fallback = format!("{}-{}", base, Utc::now().timestamp_millis());
    tracing::warn!(
        base = %base,
        slug = %fallback,
        "Slug numbering exhausted, falling back to timestamp suffix"
    );
    Ok(fallback)
}

/// Validate an externally supplied slug (manual post creation / lookups).
///
/// Accepts lowercase alphanumerics and single hyphens, no edge hyphens.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty() && slugify(slug) == slug
}
