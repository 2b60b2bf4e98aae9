//! dancebeat-blog library - AI-assisted blog microservice
//!
//! Generates blog posts on a day-of-year rotation through an LLM API,
//! serves the blog CRUD endpoints, manages featured-image media, and
//! fans notifications out to Telegram.

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::services::ServeDir;

pub mod api;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod generation;
pub mod models;
pub mod pagination;
pub mod rotation;
pub mod services;

use config::BlogConfig;
use services::{ImageGenerator, MediaStore, TelegramNotifier, TextGenerator};

/// Application state shared across HTTP handlers.
///
/// All external collaborators are injected here so tests can substitute
/// doubles for the network-facing clients.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Text-generation client
    pub text: Arc<dyn TextGenerator>,
    /// Image-generation client
    pub image: Arc<dyn ImageGenerator>,
    /// Best-effort notification channel
    pub notifier: Arc<TelegramNotifier>,
    /// Disk-backed media storage
    pub media: Arc<MediaStore>,
    /// Resolved runtime configuration
    pub config: Arc<BlogConfig>,
    /// Service start time (health endpoint uptime)
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        text: Arc<dyn TextGenerator>,
        image: Arc<dyn ImageGenerator>,
        notifier: TelegramNotifier,
        media: MediaStore,
        config: BlogConfig,
    ) -> Self {
        Self {
            db,
            text,
            image,
            notifier: Arc::new(notifier),
            media: Arc::new(media),
            config: Arc::new(config),
            startup_time: Utc::now(),
        }
    }
}

/// Build application router.
///
/// Admin routes require the password header (or the cron bypass); public
/// routes include the blog read endpoints, newsletter signup, the OG card
/// renderer, and static media.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;

    let media_dir = state.media.media_dir().to_path_buf();

    // Generation trigger: admin password or the cron key
    let generate = api::generate::routes().layer(middleware::from_fn_with_state(
        state.clone(),
        api::auth::admin_or_cron_middleware,
    ));

    // Other protected routes: admin password only
    let protected = Router::new()
        .merge(api::posts::admin_routes())
        .merge(api::images::routes())
        .merge(api::newsletter::admin_routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth::admin_auth_middleware,
        ))
        .merge(generate);

    // Public routes (no authentication)
    let public = Router::new()
        .merge(api::health::routes())
        .merge(api::posts::public_routes())
        .merge(api::newsletter::public_routes())
        .merge(api::og::routes());

    Router::new()
        .merge(protected)
        .merge(public)
        .nest_service("/media", ServeDir::new(media_dir))
        .with_state(state)
}
