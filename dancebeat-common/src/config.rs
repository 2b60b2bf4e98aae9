//! Configuration loading and root folder resolution
//!
//! The root folder holds everything the services persist: the SQLite
//! database, stored media assets, and the optional TOML config file.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// TOML configuration file contents (`dancebeat.toml`)
///
/// All fields are optional; environment variables take priority over the
/// TOML file for secrets (see the blog service's config resolution).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Root folder override
    pub root_folder: Option<String>,
    /// LLM API key (text + image generation)
    pub llm_api_key: Option<String>,
    /// LLM API base URL (OpenAI-compatible)
    pub llm_base_url: Option<String>,
    /// Chat model name
    pub llm_model: Option<String>,
    /// Image model name
    pub image_model: Option<String>,
    /// Telegram bot token for notifications
    pub telegram_bot_token: Option<String>,
    /// Telegram chat id for notifications
    pub telegram_chat_id: Option<String>,
    /// Admin password for write endpoints
    pub admin_password: Option<String>,
    /// Shared secret accepted from scheduled-generation callers
    pub cron_key: Option<String>,
    /// Public base URL of the site (used for media and OG links)
    pub site_base_url: Option<String>,
    /// Disable image generation entirely (fallback chain skips to OG URL)
    pub disable_image_generation: Option<bool>,
}

/// Load TOML config from the given path
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed: {}", e)))?;
    toml::from_str(&content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
}

/// Write TOML config atomically (write temp file, then rename)
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let tmp_path = path.with_extension("toml.tmp");
    std::fs::write(&tmp_path, content)?;
    std::fs::rename(&tmp_path, path)?;

    Ok(())
}

/// Root folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file
/// 4. OS-dependent compiled default (fallback)
pub struct RootFolderResolver {
    module_name: String,
}

impl RootFolderResolver {
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
        }
    }

    /// Resolve the root folder from CLI arg, environment, TOML, or default
    pub fn resolve(&self, cli_arg: Option<&Path>) -> PathBuf {
        // Priority 1: Command-line argument
        if let Some(path) = cli_arg {
            return path.to_path_buf();
        }

        // Priority 2: Environment variable
        if let Ok(path) = std::env::var("DANCEBEAT_ROOT_FOLDER") {
            if !path.trim().is_empty() {
                return PathBuf::from(path);
            }
        }

        // Priority 3: TOML config file
        if let Some(config_path) = default_config_path() {
            if config_path.exists() {
                if let Ok(config) = load_toml_config(&config_path) {
                    if let Some(root) = config.root_folder {
                        return PathBuf::from(root);
                    }
                }
            }
        }

        // Priority 4: OS-dependent compiled default
        let default = default_root_folder();
        tracing::debug!(
            module = %self.module_name,
            path = %default.display(),
            "Root folder not configured, using platform default"
        );
        default
    }
}

/// Get default configuration file path for the platform
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("dancebeat").join("dancebeat.toml"))
}

/// Get OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        dirs::data_local_dir()
            .map(|d| d.join("dancebeat"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/dancebeat"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("dancebeat"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/dancebeat"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("dancebeat"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\dancebeat"))
    } else {
        PathBuf::from("./dancebeat_data")
    }
}

/// Root folder initializer - ensures the directory tree exists
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    /// Create the root folder (and media subfolder) if missing
    pub fn ensure_directory_exists(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root_folder)?;
        std::fs::create_dir_all(self.media_path())?;
        Ok(())
    }

    /// Path of the SQLite database inside the root folder
    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join("dancebeat.db")
    }

    /// Path of the stored media directory inside the root folder
    pub fn media_path(&self) -> PathBuf {
        self.root_folder.join("media")
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }
}
