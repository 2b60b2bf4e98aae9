//! Newsletter signup and subscriber management endpoints

use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::db::subscribers::{self, SignupOutcome};
use crate::error::{ApiError, ApiResult};
use crate::services::telegram::NotifyEvent;
use crate::AppState;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// POST /api/newsletter-signup request
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// POST /api/newsletter-signup
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> ApiResult<Json<Value>> {
    let email = request.email.trim().to_lowercase();
    if !EMAIL_RE.is_match(&email) {
        return Err(ApiError::BadRequest(format!("Invalid email address: {}", request.email)));
    }

    match subscribers::signup(&state.db, &email, &request.tags).await? {
        SignupOutcome::Created => {
            // Side-channel notification, best-effort
            state
                .notifier
                .notify(&NotifyEvent::NewSubscriber { email: email.clone() })
                .await;
            Ok(Json(json!({ "success": true, "status": "subscribed" })))
        }
        SignupOutcome::Reactivated => {
            Ok(Json(json!({ "success": true, "status": "resubscribed" })))
        }
        SignupOutcome::AlreadySubscribed => Err(ApiError::Conflict(format!(
            "{} is already subscribed",
            email
        ))),
    }
}

/// POST /api/newsletter request (subscriber self-service)
#[derive(Debug, Deserialize)]
pub struct ManageRequest {
    pub email: String,
    /// "unsubscribe" or "preferences"
    pub action: String,
    pub preferences: Option<serde_json::Value>,
}

/// POST /api/newsletter
pub async fn manage(
    State(state): State<AppState>,
    Json(request): Json<ManageRequest>,
) -> ApiResult<Json<Value>> {
    let email = request.email.trim().to_lowercase();

    match request.action.as_str() {
        "unsubscribe" => {
            if !subscribers::unsubscribe(&state.db, &email).await? {
                return Err(ApiError::NotFound(format!("No subscriber: {}", email)));
            }
            Ok(Json(json!({ "success": true, "status": "unsubscribed" })))
        }
        "preferences" => {
            let preferences = request.preferences.ok_or_else(|| {
                ApiError::BadRequest("preferences payload required".to_string())
            })?;
            if !subscribers::update_preferences(&state.db, &email, &preferences).await? {
                return Err(ApiError::NotFound(format!("No subscriber: {}", email)));
            }
            Ok(Json(json!({ "success": true, "status": "updated" })))
        }
        other => Err(ApiError::BadRequest(format!("Unknown action: {}", other))),
    }
}

/// GET /api/newsletter (admin)
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let subs = subscribers::list_subscribers(&state.db).await?;
    Ok(Json(json!({ "total": subs.len(), "subscribers": subs })))
}

/// DELETE /api/newsletter/{email} (admin, compliance removal)
pub async fn remove(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> ApiResult<Json<Value>> {
    let email = email.trim().to_lowercase();
    if !subscribers::delete_subscriber(&state.db, &email).await? {
        return Err(ApiError::NotFound(format!("No subscriber: {}", email)));
    }
    tracing::info!(email = %email, "Subscriber deleted");
    Ok(Json(json!({ "success": true })))
}

/// Public newsletter routes
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/newsletter-signup", post(signup))
        .route("/api/newsletter", post(manage))
}

/// Admin newsletter routes
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/api/newsletter", get(list))
        .route("/api/newsletter/:email", delete(remove))
}
