//! Image-generation API client (OpenAI-compatible images endpoint)

use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

// Image models are slower than chat models; give them more room.
const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Image-generation client errors
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("No image data in response")]
    NoImageData,
}

/// Seam for featured-image generation.
///
/// Returns encoded image bytes (PNG or JPEG); the media store re-encodes
/// to the final format. The production implementation is
/// [`ImageApiClient`]; tests inject stubs, typically failing ones to
/// exercise the fallback chain.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<Vec<u8>, ImageError>;
}

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u32,
    size: &'a str,
    response_format: &'a str,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    data: Vec<ImageDatum>,
}

#[derive(Debug, Deserialize)]
struct ImageDatum {
    b64_json: Option<String>,
}

/// Images API client
pub struct ImageApiClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl ImageApiClient {
    pub fn new(api_key: String, base_url: Option<String>, model: String) -> Result<Self, ImageError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ImageError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key,
            model,
        })
    }
}

#[async_trait]
impl ImageGenerator for ImageApiClient {
    async fn generate(&self, prompt: &str) -> Result<Vec<u8>, ImageError> {
        let url = format!("{}/images/generations", self.base_url.trim_end_matches('/'));

        let request = ImageRequest {
            model: &self.model,
            prompt,
            n: 1,
            size: "1792x1024",
            response_format: "b64_json",
        };

        tracing::debug!(model = %self.model, "Requesting image generation");

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ImageError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ImageError::Api(status.as_u16(), error_text));
        }

        let parsed: ImageResponse = response
            .json()
            .await
            .map_err(|e| ImageError::Parse(e.to_string()))?;

        let b64 = parsed
            .data
            .into_iter()
            .next()
            .and_then(|d| d.b64_json)
            .ok_or(ImageError::NoImageData)?;

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(b64.as_bytes())
            .map_err(|e| ImageError::Parse(e.to_string()))?;

        tracing::debug!(bytes = bytes.len(), "Image generation received");
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = ImageApiClient::new("key".to_string(), None, "test-image-model".to_string());
        assert!(client.is_ok());
    }
}
