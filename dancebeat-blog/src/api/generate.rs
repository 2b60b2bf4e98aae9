//! Blog generation API handler
//!
//! POST /api/blog/generate runs the pipeline once, or `count` times
//! sequentially with a fixed delay between iterations to stay under
//! upstream rate limits.

use axum::{
    extract::State,
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use crate::error::{ApiError, ApiResult};
use crate::generation::{self, GenerateParams};
use crate::AppState;

/// Cap on batch size per request
const MAX_BATCH_COUNT: u32 = 10;

/// Crude throttle between batch iterations
const BATCH_DELAY: Duration = Duration::from_secs(5);

/// POST /api/blog/generate request
#[derive(Debug, Default, Deserialize)]
pub struct GenerateRequest {
    pub topic: Option<String>,
    pub count: Option<u32>,
    pub character: Option<String>,
    pub category: Option<String>,
}

/// POST /api/blog/generate
pub async fn generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> ApiResult<Json<Value>> {
    let count = request.count.unwrap_or(1);
    if count == 0 || count > MAX_BATCH_COUNT {
        return Err(ApiError::BadRequest(format!(
            "count must be between 1 and {}",
            MAX_BATCH_COUNT
        )));
    }

    let params = GenerateParams {
        topic: request.topic,
        character: request.character,
        category: request.category,
    };

    if count == 1 {
        let post = generation::generate_post(&state, &params).await?;
        return Ok(Json(json!({ "success": true, "post": post })));
    }

    // Batch: sequential with a fixed inter-iteration delay.
    let mut results = Vec::with_capacity(count as usize);
    let mut generated = 0u32;
    let mut failed = 0u32;

    for i in 0..count {
        if i > 0 {
            tokio::time::sleep(BATCH_DELAY).await;
        }

        match generation::generate_post(&state, &params).await {
            Ok(post) => {
                generated += 1;
                results.push(json!({ "success": true, "slug": post.slug, "title": post.title }));
            }
            Err(e) => {
                failed += 1;
                tracing::error!(error = %e, iteration = i, "Batch generation item failed");
                results.push(json!({ "success": false, "error": e.to_string() }));
            }
        }
    }

    Ok(Json(json!({
        "success": failed == 0,
        "requested": count,
        "generated": generated,
        "failed": failed,
        "results": results,
    })))
}

/// Build generation routes (admin/cron gated)
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/blog/generate", post(generate))
}
