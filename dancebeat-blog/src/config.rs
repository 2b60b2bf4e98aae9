//! Configuration resolution for the blog service
//!
//! Secrets resolve ENV → TOML, highest priority first, with a warning when
//! a value is present in both sources.

use dancebeat_common::config::TomlConfig;
use dancebeat_common::{Error, Result};
use tracing::{info, warn};

/// Default public base URL when none is configured (local development)
const DEFAULT_SITE_BASE_URL: &str = "http://localhost:5780";

const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";
const DEFAULT_IMAGE_MODEL: &str = "dall-e-3";

/// Resolved runtime configuration for the blog service
#[derive(Debug, Clone)]
pub struct BlogConfig {
    pub llm_api_key: String,
    pub llm_base_url: Option<String>,
    pub llm_model: String,
    pub image_model: String,
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    pub admin_password: String,
    pub cron_key: Option<String>,
    pub site_base_url: String,
    pub disable_image_generation: bool,
}

/// Resolve a secret from ENV → TOML, warning on multiple sources
fn resolve_secret(env_var: &str, toml_value: Option<&String>) -> Option<String> {
    let env_value = std::env::var(env_var).ok().filter(|v| !v.trim().is_empty());
    let toml_value = toml_value.filter(|v| !v.trim().is_empty());

    if env_value.is_some() && toml_value.is_some() {
        warn!(
            "{} found in both environment and TOML config. Using environment (highest priority).",
            env_var
        );
    }

    env_value.or_else(|| toml_value.cloned())
}

/// Resolve the full blog configuration.
///
/// The LLM API key and admin password are required; everything else is
/// optional or defaulted.
pub fn resolve_blog_config(toml_config: &TomlConfig) -> Result<BlogConfig> {
    let llm_api_key = resolve_secret("DANCEBEAT_LLM_API_KEY", toml_config.llm_api_key.as_ref())
        .ok_or_else(|| {
            Error::Config(
                "LLM API key not configured. Please configure using one of:\n\
                 1. Environment: DANCEBEAT_LLM_API_KEY=your-key-here\n\
                 2. TOML config: dancebeat.toml (llm_api_key = \"your-key\")"
                    .to_string(),
            )
        })?;

    let admin_password = resolve_secret(
        "DANCEBEAT_ADMIN_PASSWORD",
        toml_config.admin_password.as_ref(),
    )
    .ok_or_else(|| {
        Error::Config(
            "Admin password not configured. Please configure using one of:\n\
             1. Environment: DANCEBEAT_ADMIN_PASSWORD=your-password\n\
             2. TOML config: dancebeat.toml (admin_password = \"your-password\")"
                .to_string(),
        )
    })?;

    let telegram_bot_token = resolve_secret(
        "DANCEBEAT_TELEGRAM_BOT_TOKEN",
        toml_config.telegram_bot_token.as_ref(),
    );
    let telegram_chat_id = resolve_secret(
        "DANCEBEAT_TELEGRAM_CHAT_ID",
        toml_config.telegram_chat_id.as_ref(),
    );
    if telegram_bot_token.is_some() != telegram_chat_id.is_some() {
        warn!("Telegram partially configured (need both bot token and chat id); notifications disabled");
    }

    let disable_image_generation = std::env::var("DANCEBEAT_DISABLE_IMAGE_GENERATION")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or_else(|_| toml_config.disable_image_generation.unwrap_or(false));

    let config = BlogConfig {
        llm_api_key,
        llm_base_url: resolve_secret("DANCEBEAT_LLM_BASE_URL", toml_config.llm_base_url.as_ref()),
        llm_model: resolve_secret("DANCEBEAT_LLM_MODEL", toml_config.llm_model.as_ref())
            .unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
        image_model: resolve_secret("DANCEBEAT_IMAGE_MODEL", toml_config.image_model.as_ref())
            .unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string()),
        telegram_bot_token,
        telegram_chat_id,
        admin_password,
        cron_key: resolve_secret("DANCEBEAT_CRON_KEY", toml_config.cron_key.as_ref()),
        site_base_url: resolve_secret("DANCEBEAT_SITE_BASE_URL", toml_config.site_base_url.as_ref())
            .unwrap_or_else(|| DEFAULT_SITE_BASE_URL.to_string()),
        disable_image_generation,
    };

    info!(
        model = %config.llm_model,
        image_model = %config.image_model,
        site = %config.site_base_url,
        images_disabled = config.disable_image_generation,
        "Blog configuration resolved"
    );

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_toml() -> TomlConfig {
        TomlConfig {
            llm_api_key: Some("toml-key".to_string()),
            admin_password: Some("toml-password".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_resolves_from_toml() {
        let config = resolve_blog_config(&base_toml()).expect("Config should resolve");
        assert_eq!(config.llm_api_key, "toml-key");
        assert_eq!(config.admin_password, "toml-password");
        assert_eq!(config.llm_model, DEFAULT_LLM_MODEL);
        assert_eq!(config.site_base_url, DEFAULT_SITE_BASE_URL);
        assert!(!config.disable_image_generation);
        assert!(config.cron_key.is_none());
    }

    #[test]
    fn test_missing_required_keys_error() {
        let err = resolve_blog_config(&TomlConfig::default())
            .expect_err("Missing LLM key should fail");
        assert!(err.to_string().contains("LLM API key"));

        let mut toml = TomlConfig::default();
        toml.llm_api_key = Some("k".to_string());
        let err = resolve_blog_config(&toml).expect_err("Missing admin password should fail");
        assert!(err.to_string().contains("Admin password"));
    }

    #[test]
    fn test_image_disable_flag_from_toml() {
        let mut toml = base_toml();
        toml.disable_image_generation = Some(true);
        let config = resolve_blog_config(&toml).unwrap();
        assert!(config.disable_image_generation);
    }
}
