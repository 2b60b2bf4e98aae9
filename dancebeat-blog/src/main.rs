//! dancebeat-blog - AI-assisted blog microservice
//!
//! Serves the blog API for the DanceBeat community site: scheduled and
//! manual post generation, CRUD, media management, newsletter capture.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dancebeat_blog::config::resolve_blog_config;
use dancebeat_blog::services::{ImageApiClient, LlmClient, MediaStore, TelegramNotifier};
use dancebeat_blog::{build_router, AppState};
use dancebeat_common::config::{
    default_config_path, load_toml_config, RootFolderInitializer, RootFolderResolver, TomlConfig,
};

/// Command-line arguments for dancebeat-blog
#[derive(Parser, Debug)]
#[command(name = "dancebeat-blog")]
#[command(about = "Blog microservice for the DanceBeat community site")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "5780", env = "DANCEBEAT_BLOG_PORT")]
    port: u16,

    /// Root folder for the database and stored media
    #[arg(short, long, env = "DANCEBEAT_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dancebeat_blog=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!(
        "Starting DanceBeat Blog (dancebeat-blog) v{} on port {}",
        env!("CARGO_PKG_VERSION"),
        args.port
    );

    // Resolve and initialize the root folder
    let resolver = RootFolderResolver::new("blog");
    let root_folder = resolver.resolve(args.root_folder.as_deref());

    let initializer = RootFolderInitializer::new(root_folder);
    initializer
        .ensure_directory_exists()
        .context("Failed to initialize root folder")?;
    info!("Root folder: {}", initializer.root_folder().display());

    // TOML config: root-folder-local file first, then the platform path
    let toml_config = load_first_toml(&initializer);

    let config = resolve_blog_config(&toml_config).context("Configuration error")?;

    // Open or create the database
    let db_path = initializer.database_path();
    info!("Database: {}", db_path.display());
    let pool = dancebeat_blog::db::init_database_pool(&db_path)
        .await
        .context("Failed to open database")?;
    info!("Database connection established");

    // Construct external clients explicitly; they are injected through
    // AppState rather than living as module globals.
    let llm = LlmClient::new(
        config.llm_api_key.clone(),
        config.llm_base_url.clone(),
        config.llm_model.clone(),
    )
    .map_err(|e| anyhow::anyhow!("Failed to create LLM client: {}", e))?;

    let image = ImageApiClient::new(
        config.llm_api_key.clone(),
        config.llm_base_url.clone(),
        config.image_model.clone(),
    )
    .map_err(|e| anyhow::anyhow!("Failed to create image client: {}", e))?;

    let notifier = TelegramNotifier::new(
        config.telegram_bot_token.clone(),
        config.telegram_chat_id.clone(),
    );

    let media = MediaStore::new(initializer.media_path(), &config.site_base_url);

    let state = AppState::new(pool, Arc::new(llm), Arc::new(image), notifier, media, config);
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://127.0.0.1:{}/health", args.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Load the first TOML config found: `{root}/dancebeat.toml`, then the
/// platform config path. Missing files are fine; defaults apply.
fn load_first_toml(initializer: &RootFolderInitializer) -> TomlConfig {
    let local = initializer.root_folder().join("dancebeat.toml");
    if local.exists() {
        match load_toml_config(&local) {
            Ok(config) => {
                info!("Loaded config from {}", local.display());
                return config;
            }
            Err(e) => tracing::warn!(error = %e, "Ignoring unreadable local config"),
        }
    }

    if let Some(path) = default_config_path() {
        if path.exists() {
            match load_toml_config(&path) {
                Ok(config) => {
                    info!("Loaded config from {}", path.display());
                    return config;
                }
                Err(e) => tracing::warn!(error = %e, "Ignoring unreadable platform config"),
            }
        }
    }

    TomlConfig::default()
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
