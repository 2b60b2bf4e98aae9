//! Shared test harness: stub generators and state construction

use async_trait::async_trait;
use sqlx::SqlitePool;
use std::path::Path;
use std::sync::Arc;

use dancebeat_blog::config::BlogConfig;
use dancebeat_blog::services::{
    ImageError, ImageGenerator, LlmError, MediaStore, TelegramNotifier, TextGenerator,
};
use dancebeat_blog::AppState;

pub const TEST_SITE_BASE: &str = "https://dancebeat.example";
pub const TEST_ADMIN_PASSWORD: &str = "test-admin-password";
pub const TEST_CRON_KEY: &str = "test-cron-key";

/// Default stub article: heading, body, a stray SEO artifact line, FAQ.
pub const STUB_ARTICLE: &str = "\
# Test Topic Deep Dive

Dancing is a conversation between partners, and this topic proves it.

Meta Description: stray artifact that should be stripped

Practice slowly, then add musicality.

## FAQ

Q: Is this a test?
A: Yes, and a thorough one.
";

pub const STUB_SEO: &str = "\
SEO Title: Test Topic Deep Dive
Meta Description: A crisp description for search engines.
Category: salsa
Tags: salsa, practice, test
";

/// Text stub: returns canned article/SEO responses, or fails on demand
pub struct StubText {
    pub article: String,
    pub seo: String,
    pub fail_article: bool,
    pub fail_seo: bool,
}

impl Default for StubText {
    fn default() -> Self {
        Self {
            article: STUB_ARTICLE.to_string(),
            seo: STUB_SEO.to_string(),
            fail_article: false,
            fail_seo: false,
        }
    }
}

#[async_trait]
impl TextGenerator for StubText {
    async fn complete(&self, _system_prompt: &str, user_prompt: &str) -> Result<String, LlmError> {
        let is_seo_call = user_prompt.starts_with("For the blog article below");
        if is_seo_call {
            if self.fail_seo {
                return Err(LlmError::Network("stub SEO failure".to_string()));
            }
            Ok(self.seo.clone())
        } else {
            if self.fail_article {
                return Err(LlmError::Network("stub article failure".to_string()));
            }
            Ok(self.article.clone())
        }
    }
}

/// Image stub: either serves fixed bytes or always fails
pub struct StubImage {
    pub bytes: Option<Vec<u8>>,
}

impl StubImage {
    pub fn failing() -> Self {
        Self { bytes: None }
    }

    pub fn serving(bytes: Vec<u8>) -> Self {
        Self { bytes: Some(bytes) }
    }
}

#[async_trait]
impl ImageGenerator for StubImage {
    async fn generate(&self, _prompt: &str) -> Result<Vec<u8>, ImageError> {
        match &self.bytes {
            Some(bytes) => Ok(bytes.clone()),
            None => Err(ImageError::Api(500, "stub image failure".to_string())),
        }
    }
}

pub fn test_config(disable_images: bool) -> BlogConfig {
    BlogConfig {
        llm_api_key: "test-key".to_string(),
        llm_base_url: None,
        llm_model: "test-model".to_string(),
        image_model: "test-image-model".to_string(),
        telegram_bot_token: None,
        telegram_chat_id: None,
        admin_password: TEST_ADMIN_PASSWORD.to_string(),
        cron_key: Some(TEST_CRON_KEY.to_string()),
        site_base_url: TEST_SITE_BASE.to_string(),
        disable_image_generation: disable_images,
    }
}

pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePool::connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");
    dancebeat_blog::db::init_tables(&pool)
        .await
        .expect("Failed to init tables");
    pool
}

/// Build an AppState around stub generators and a media dir
pub async fn test_state(text: StubText, image: StubImage, media_dir: &Path) -> AppState {
    AppState::new(
        test_pool().await,
        Arc::new(text),
        Arc::new(image),
        TelegramNotifier::disabled(),
        MediaStore::new(media_dir.to_path_buf(), TEST_SITE_BASE),
        test_config(false),
    )
}

/// Valid JPEG bytes for upload/generation stubs
pub fn sample_jpeg(media_dir: &Path) -> Vec<u8> {
    MediaStore::new(media_dir.to_path_buf(), TEST_SITE_BASE)
        .placeholder_card("sample-source")
        .expect("placeholder card should encode")
}
