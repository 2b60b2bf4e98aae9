//! Procedural OG social-card endpoint
//!
//! Tier-3 image fallback target: posts whose image pipeline fully failed
//! point here, and the card is rendered on demand with no stored asset.

use axum::{
    extract::Query,
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;

use crate::services::og::render_og_svg;
use crate::AppState;

/// GET /api/og query parameters
#[derive(Debug, Default, Deserialize)]
pub struct OgQuery {
    #[serde(default)]
    pub title: String,
    // Accepted for cache-busting per post; not used in the render
    #[serde(default)]
    pub slug: String,
}

/// GET /api/og?title=...&slug=...
pub async fn og_card(Query(query): Query<OgQuery>) -> Response {
    let svg = render_og_svg(&query.title);
    (
        [(header::CONTENT_TYPE, "image/svg+xml"), (header::CACHE_CONTROL, "public, max-age=86400")],
        svg,
    )
        .into_response()
}

/// Build OG card routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/og", get(og_card))
}
