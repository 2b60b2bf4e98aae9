//! Procedural OG-image support
//!
//! The tier-3 image fallback stores no asset at all: the post's featured
//! image becomes a URL into our own `/api/og` endpoint, which renders a
//! social card as SVG on demand.

use url::form_urlencoded;

/// Build the procedural OG-image URL for a post:
/// `{base}/api/og?title=...&slug=...`
pub fn og_image_url(site_base_url: &str, title: &str, slug: &str) -> String {
    let query: String = form_urlencoded::Serializer::new(String::new())
        .append_pair("title", title)
        .append_pair("slug", slug)
        .finish();

    format!("{}/api/og?{}", site_base_url.trim_end_matches('/'), query)
}

/// Render the social card as SVG.
///
/// SVG keeps text rendering on the client, so no font rasterization is
/// needed server-side.
pub fn render_og_svg(title: &str) -> String {
    let display_title = if title.trim().is_empty() {
        "DanceBeat"
    } else {
        title.trim()
    };

    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="1200" height="630" viewBox="0 0 1200 630">
  <defs>
    <linearGradient id="bg" x1="0" y1="0" x2="1" y2="1">
      <stop offset="0%" stop-color="#2b1055"/>
      <stop offset="100%" stop-color="#7597de"/>
    </linearGradient>
  </defs>
  <rect width="1200" height="630" fill="url(#bg)"/>
  <text x="80" y="300" font-family="Georgia, serif" font-size="56" fill="#ffffff">{title}</text>
  <text x="80" y="560" font-family="Georgia, serif" font-size="28" fill="#d8d8f0">DanceBeat — stories from the dance floor</text>
</svg>
"##,
        title = escape_xml(display_title)
    )
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_og_url_format() {
        let url = og_image_url(
            "https://dancebeat.example",
            "Test Topic",
            "2025-06-01-test-topic",
        );
        assert_eq!(
            url,
            "https://dancebeat.example/api/og?title=Test+Topic&slug=2025-06-01-test-topic"
        );
    }

    #[test]
    fn test_og_url_encodes_specials() {
        let url = og_image_url("https://dancebeat.example/", "Salsa & Soul?", "s");
        assert!(url.contains("title=Salsa+%26+Soul%3F"));
        assert!(!url.contains("example//api"));
    }

    #[test]
    fn test_svg_escapes_title() {
        let svg = render_og_svg("<script>alert('x')</script>");
        assert!(!svg.contains("<script>"));
        assert!(svg.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_svg_empty_title_falls_back() {
        assert!(render_og_svg("  ").contains(">DanceBeat</text>"));
    }
}
