//! Telegram notification dispatcher
//!
//! Strictly best-effort: `notify` returns a bool and logs failures, it
//! never propagates an error to the generation pipeline or a handler.

use serde::{Deserialize, Serialize};
use std::time::Duration;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Events reported to the notification channel
#[derive(Debug, Clone)]
pub enum NotifyEvent {
    PostPublished {
        title: String,
        slug: String,
        category: String,
        author: String,
    },
    GenerationFailed {
        topic: String,
        error: String,
    },
    NewSubscriber {
        email: String,
    },
}

impl NotifyEvent {
    fn format_message(&self) -> String {
        match self {
            NotifyEvent::PostPublished {
                title,
                slug,
                category,
                author,
            } => format!(
                "📝 New post published\n{}\nby {} in {}\nslug: {}",
                title, author, category, slug
            ),
            NotifyEvent::GenerationFailed { topic, error } => {
                format!("⚠️ Blog generation failed\ntopic: {}\nerror: {}", topic, error)
            }
            NotifyEvent::NewSubscriber { email } => {
                format!("📬 New newsletter subscriber: {}", email)
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    ok: bool,
}

/// Telegram bot notifier. Unconfigured (no token/chat id) means disabled:
/// every notify call is a logged no-op returning false.
pub struct TelegramNotifier {
    http_client: reqwest::Client,
    token: Option<String>,
    chat_id: Option<String>,
}

impl TelegramNotifier {
    pub fn new(token: Option<String>, chat_id: Option<String>) -> Self {
        if token.is_none() || chat_id.is_none() {
            tracing::info!("Telegram notifier disabled (token or chat id not configured)");
        }

        Self {
            http_client: reqwest::Client::builder()
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .unwrap_or_default(),
            token,
            chat_id,
        }
    }

    /// Disabled notifier for contexts with no notification channel
    pub fn disabled() -> Self {
        Self::new(None, None)
    }

    /// Post an event to the chat. Returns true on confirmed delivery,
    /// false on any failure. Never an error.
    pub async fn notify(&self, event: &NotifyEvent) -> bool {
        let (Some(token), Some(chat_id)) = (&self.token, &self.chat_id) else {
            tracing::debug!("Notification skipped (notifier disabled)");
            return false;
        };

        let url = format!("{}/bot{}/sendMessage", TELEGRAM_API_BASE, token);
        let text = event.format_message();

        let result = self
            .http_client
            .post(&url)
            .json(&SendMessageRequest {
                chat_id,
                text: &text,
            })
            .send()
            .await;

        let response = match result {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, "Telegram notification failed (network)");
                return false;
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = %status, "Telegram notification rejected");
            return false;
        }

        match response.json::<SendMessageResponse>().await {
            Ok(body) if body.ok => {
                tracing::debug!("Telegram notification delivered");
                true
            }
            Ok(_) => {
                tracing::warn!("Telegram API reported ok=false");
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "Telegram notification response unreadable");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_notifier_returns_false() {
        let notifier = TelegramNotifier::disabled();
        let delivered = notifier
            .notify(&NotifyEvent::NewSubscriber {
                email: "dancer@example.com".to_string(),
            })
            .await;
        assert!(!delivered);
    }

    #[test]
    fn test_message_formats() {
        let msg = NotifyEvent::PostPublished {
            title: "Title".to_string(),
            slug: "2025-06-01-title".to_string(),
            category: "salsa".to_string(),
            author: "Marisol Vega".to_string(),
        }
        .format_message();
        assert!(msg.contains("Title"));
        assert!(msg.contains("2025-06-01-title"));

        let msg = NotifyEvent::GenerationFailed {
            topic: "Topic".to_string(),
            error: "boom".to_string(),
        }
        .format_message();
        assert!(msg.contains("boom"));
    }
}
