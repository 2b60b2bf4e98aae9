//! Admin authentication middleware
//!
//! Write endpoints require `x-admin-password` matching the configured
//! secret. The generation trigger additionally accepts `x-cron-key` so
//! scheduled callers don't carry the admin password. This is deliberately
//! a single shared-secret compare, kept isolated in this one module.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::error::ApiError;
use crate::AppState;

fn has_admin_password(state: &AppState, request: &Request) -> bool {
    request
        .headers()
        .get("x-admin-password")
        .and_then(|v| v.to_str().ok())
        == Some(state.config.admin_password.as_str())
}

fn has_cron_key(state: &AppState, request: &Request) -> bool {
    match &state.config.cron_key {
        Some(cron_key) => {
            request
                .headers()
                .get("x-cron-key")
                .and_then(|v| v.to_str().ok())
                == Some(cron_key.as_str())
        }
        None => false,
    }
}

fn reject(request: &Request) -> ApiError {
    warn!(
        path = %request.uri().path(),
        "Rejected request with missing or invalid admin credentials"
    );
    ApiError::Unauthorized("Missing or invalid admin credentials".to_string())
}

/// Admin authentication middleware.
///
/// Applied to protected routes only; health and public read endpoints do
/// NOT use this middleware.
pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if has_admin_password(&state, &request) {
        return Ok(next.run(request).await);
    }
    Err(reject(&request))
}

/// Authentication for the generation trigger: admin password or cron key.
pub async fn admin_or_cron_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if has_admin_password(&state, &request) || has_cron_key(&state, &request) {
        return Ok(next.run(request).await);
    }
    Err(reject(&request))
}
