//! Blog post CRUD API handlers

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use dancebeat_common::slug::{is_valid_slug, make_unique_slug};

use crate::catalog;
use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::generation::seo;
use crate::models::{BlogPost, PostStatus};
use crate::pagination::{calculate_pagination, DEFAULT_PAGE_SIZE};
use crate::services::og;
use crate::AppState;

/// GET /api/blog query parameters
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub status: Option<String>,
}

/// GET /api/blog
///
/// Paginated listing, newest first, optionally filtered by status.
pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Value>> {
    let status = match &query.status {
        Some(s) => Some(
            PostStatus::parse(s)
                .ok_or_else(|| ApiError::BadRequest(format!("Unknown status: {}", s)))?,
        ),
        None => None,
    };

    let total = db::posts::count_posts(&state.db, status).await?;
    let pagination = calculate_pagination(
        total,
        query.page.unwrap_or(1),
        query.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
    );

    let posts =
        db::posts::list_posts(&state.db, status, pagination.page_size, pagination.offset).await?;

    Ok(Json(json!({
        "posts": posts,
        "pagination": pagination,
    })))
}

/// GET /api/blog/{slug}
///
/// Fetch a post and bump its view counter. The increment is best-effort;
/// a failed bump never fails the read.
pub async fn get_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<Value>> {
    if let Err(e) = db::posts::increment_view_count(&state.db, &slug).await {
        tracing::warn!(slug = %slug, error = %e, "View count increment failed");
    }

    let post = db::posts::get_post_by_slug(&state.db, &slug)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No post with slug: {}", slug)))?;

    Ok(Json(json!({ "post": post })))
}

/// POST /api/blog request (manual post creation)
#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub author: Option<String>,
    pub character: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub featured_image: Option<String>,
    pub status: Option<String>,
    pub slug: Option<String>,
}

/// POST /api/blog
pub async fn create_post(
    State(state): State<AppState>,
    Json(request): Json<CreatePostRequest>,
) -> ApiResult<Json<Value>> {
    if request.title.trim().is_empty() {
        return Err(ApiError::BadRequest("title must not be empty".to_string()));
    }
    if request.content.trim().is_empty() {
        return Err(ApiError::BadRequest("content must not be empty".to_string()));
    }

    let status = match &request.status {
        Some(s) => PostStatus::parse(s)
            .ok_or_else(|| ApiError::BadRequest(format!("Unknown status: {}", s)))?,
        None => PostStatus::Published,
    };

    let now = Utc::now();
    let slug = match request.slug {
        Some(slug) => {
            if !is_valid_slug(&slug) {
                return Err(ApiError::BadRequest(format!("Invalid slug format: {}", slug)));
            }
            slug
        }
        None => {
            let pool = state.db.clone();
            make_unique_slug(&request.title, now.date_naive(), move |candidate| {
                let pool = pool.clone();
                async move { db::posts::slug_exists(&pool, &candidate).await }
            })
            .await?
        }
    };

    // A known persona key fills in the author display name
    let persona = request.character.as_deref().and_then(catalog::persona);
    let author = request
        .author
        .or_else(|| persona.map(|p| p.name.to_string()))
        .unwrap_or_else(|| "DanceBeat Team".to_string());

    let excerpt = request
        .excerpt
        .unwrap_or_else(|| seo::derive_excerpt(&request.content, 160));
    let featured_image = request
        .featured_image
        .unwrap_or_else(|| og::og_image_url(&state.config.site_base_url, &request.title, &slug));

    let post = BlogPost {
        id: Uuid::new_v4(),
        title: request.title,
        slug,
        content: request.content,
        excerpt,
        author,
        character: persona.map(|p| p.key.to_string()).unwrap_or_default(),
        category: request.category.unwrap_or_default(),
        topic: String::new(),
        tags: request.tags.unwrap_or_default(),
        featured_image,
        status,
        faq: None,
        created_at: now,
        updated_at: now,
        published_at: (status == PostStatus::Published).then_some(now),
        view_count: 0,
    };

    match db::posts::create_post(&state.db, &post).await {
        Ok(()) => Ok(Json(json!({ "success": true, "post": post }))),
        Err(e) if db::is_unique_violation(&e) => Err(ApiError::Conflict(format!(
            "A post with slug '{}' already exists",
            post.slug
        ))),
        Err(e) => Err(e.into()),
    }
}

/// PUT /api/blog/{slug} request
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub featured_image: Option<String>,
    pub status: Option<String>,
}

/// PUT /api/blog/{slug}
pub async fn update_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(request): Json<UpdatePostRequest>,
) -> ApiResult<Json<Value>> {
    let status = match &request.status {
        Some(s) => Some(
            PostStatus::parse(s)
                .ok_or_else(|| ApiError::BadRequest(format!("Unknown status: {}", s)))?,
        ),
        None => None,
    };

    let changes = db::posts::UpdatePost {
        title: request.title,
        content: request.content,
        excerpt: request.excerpt,
        category: request.category,
        tags: request.tags,
        featured_image: request.featured_image,
        status,
    };

    let post = db::posts::update_post(&state.db, &slug, &changes)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No post with slug: {}", slug)))?;

    Ok(Json(json!({ "success": true, "post": post })))
}

/// DELETE /api/blog/{slug}
///
/// Deletes the stored featured image first and fails the whole deletion if
/// cleanup errors (fail-closed). Images not managed by the media store are
/// skipped and the deletion proceeds.
pub async fn delete_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<Value>> {
    let post = db::posts::get_post_by_slug(&state.db, &slug)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No post with slug: {}", slug)))?;

    if state.media.is_managed_url(&post.featured_image) {
        state
            .media
            .delete_by_url(&post.featured_image)
            .map_err(|e| ApiError::Internal(format!("Image cleanup failed: {}", e)))?;
    } else if !post.featured_image.is_empty() {
        tracing::debug!(
            slug = %slug,
            url = %post.featured_image,
            "Featured image not managed by media store, skipping cleanup"
        );
    }

    db::posts::delete_post(&state.db, &slug).await?;
    tracing::info!(slug = %slug, "Blog post deleted");

    Ok(Json(json!({ "success": true })))
}

/// Public read routes
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/blog", get(list_posts))
        .route("/api/blog/:slug", get(get_post))
}

/// Admin write routes
pub fn admin_routes() -> Router<AppState> {
    use axum::routing::put;

    Router::new()
        .route("/api/blog", post(create_post))
        .route("/api/blog/:slug", put(update_post).delete(delete_post))
}
