//! Featured-image management endpoints
//!
//! Upload accepts multipart form data and normalizes whatever arrives to
//! the 1200x630 JPEG card; regenerate re-runs the image fallback chain
//! with an optional custom prompt.

use axum::{
    extract::{Multipart, Path, State},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::generation;
use crate::AppState;

/// Multipart fields accepted as the image payload
const IMAGE_FIELD_NAMES: &[&str] = &["image", "file"];

/// POST /api/blog/{slug}/image
///
/// Multipart upload. The image is re-encoded to 1200x630 JPEG, stored,
/// and set as the post's featured image.
pub async fn upload_image(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    mut multipart: Multipart,
) -> ApiResult<Json<Value>> {
    // 404 before touching the payload
    db::posts::get_post_by_slug(&state.db, &slug)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No post with slug: {}", slug)))?;

    let mut image_bytes: Option<Vec<u8>> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if IMAGE_FIELD_NAMES.contains(&name.as_str()) {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?;
            image_bytes = Some(bytes.to_vec());
            break;
        }
    }

    let bytes = image_bytes.ok_or_else(|| {
        ApiError::BadRequest("Missing multipart field 'image' or 'file'".to_string())
    })?;

    let jpeg = state
        .media
        .normalize_to_card(&bytes)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let url = state.media.store_post_image(&slug, &jpeg)?;

    db::posts::set_featured_image(&state.db, &slug, &url).await?;
    tracing::info!(slug = %slug, url = %url, "Featured image uploaded");

    Ok(Json(json!({ "success": true, "url": url })))
}

/// POST /api/blog/{slug}/image/regenerate request
#[derive(Debug, Default, Deserialize)]
pub struct RegenerateRequest {
    pub prompt: Option<String>,
}

/// POST /api/blog/{slug}/image/regenerate
///
/// Re-runs the image fallback chain; never fails on image problems, the
/// worst case is the procedural OG URL.
pub async fn regenerate_image(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(request): Json<RegenerateRequest>,
) -> ApiResult<Json<Value>> {
    let post = db::posts::get_post_by_slug(&state.db, &slug)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No post with slug: {}", slug)))?;

    let url =
        generation::resolve_featured_image(&state, &post.title, &slug, request.prompt.as_deref())
            .await;

    db::posts::set_featured_image(&state.db, &slug, &url).await?;
    tracing::info!(slug = %slug, url = %url, "Featured image regenerated");

    Ok(Json(json!({ "success": true, "url": url })))
}

/// Build image management routes (admin gated)
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/blog/:slug/image", post(upload_image))
        .route("/api/blog/:slug/image/regenerate", post(regenerate_image))
}
