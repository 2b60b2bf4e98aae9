//! Domain models for the blog service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Publication status of a blog post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Published,
    Draft,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Published => "published",
            PostStatus::Draft => "draft",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "published" => Some(PostStatus::Published),
            "draft" => Some(PostStatus::Draft),
            _ => None,
        }
    }
}

/// A question/answer pair extracted from a post's FAQ section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}

/// A blog post record
///
/// `slug` is unique across all posts (UNIQUE constraint) and treated as
/// immutable once assigned. `topic` records the source topic the post was
/// generated from; the duplicate-prevention filter reads it back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    /// Markdown body
    pub content: String,
    pub excerpt: String,
    /// Display name of the author persona
    pub author: String,
    /// Persona key (see catalog)
    pub character: String,
    pub category: String,
    /// Source topic used for generation (empty for manual posts)
    pub topic: String,
    pub tags: Vec<String>,
    pub featured_image: String,
    pub status: PostStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub faq: Option<Vec<FaqEntry>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
    pub view_count: i64,
}

/// Subscription status of a newsletter subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriberStatus {
    Active,
    Unsubscribed,
}

impl SubscriberStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriberStatus::Active => "active",
            SubscriberStatus::Unsubscribed => "unsubscribed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(SubscriberStatus::Active),
            "unsubscribed" => Some(SubscriberStatus::Unsubscribed),
            _ => None,
        }
    }
}

/// A newsletter subscriber record, keyed by email
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscriber {
    pub email: String,
    pub status: SubscriberStatus,
    pub subscribed_at: DateTime<Utc>,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferences: Option<serde_json::Value>,
}
