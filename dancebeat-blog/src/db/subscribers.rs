//! Newsletter subscriber database operations

use chrono::Utc;
use dancebeat_common::Result;
use sqlx::{Row, SqlitePool};

use crate::models::{Subscriber, SubscriberStatus};

/// Outcome of a signup request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignupOutcome {
    /// New subscriber row created
    Created,
    /// Previously unsubscribed address reactivated
    Reactivated,
    /// Address already actively subscribed
    AlreadySubscribed,
}

fn row_to_subscriber(row: &sqlx::sqlite::SqliteRow) -> Subscriber {
    let status_str: String = row.get("status");
    let tags_json: String = row.get("tags");
    let prefs_json: Option<String> = row.get("preferences");

    Subscriber {
        email: row.get("email"),
        status: SubscriberStatus::parse(&status_str).unwrap_or(SubscriberStatus::Active),
        subscribed_at: row.get("subscribed_at"),
        tags: serde_json::from_str(&tags_json).unwrap_or_default(),
        preferences: prefs_json.and_then(|j| serde_json::from_str(&j).ok()),
    }
}

/// Load a subscriber by email
pub async fn get_subscriber(pool: &SqlitePool, email: &str) -> Result<Option<Subscriber>> {
    let row = sqlx::query("SELECT * FROM subscribers WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|r| row_to_subscriber(&r)))
}

/// Sign an email up, deduplicating against existing rows
pub async fn signup(pool: &SqlitePool, email: &str, tags: &[String]) -> Result<SignupOutcome> {
    if let Some(existing) = get_subscriber(pool, email).await? {
        if existing.status == SubscriberStatus::Active {
            return Ok(SignupOutcome::AlreadySubscribed);
        }

        sqlx::query("UPDATE subscribers SET status = 'active', subscribed_at = ? WHERE email = ?")
            .bind(Utc::now())
            .bind(email)
            .execute(pool)
            .await?;
        return Ok(SignupOutcome::Reactivated);
    }

    sqlx::query(
        "INSERT INTO subscribers (email, status, subscribed_at, tags) VALUES (?, 'active', ?, ?)",
    )
    .bind(email)
    .bind(Utc::now())
    .bind(serde_json::to_string(tags).unwrap_or_else(|_| "[]".to_string()))
    .execute(pool)
    .await?;

    Ok(SignupOutcome::Created)
}

/// Mark a subscriber unsubscribed. Returns false if the email is unknown.
pub async fn unsubscribe(pool: &SqlitePool, email: &str) -> Result<bool> {
    let result = sqlx::query("UPDATE subscribers SET status = 'unsubscribed' WHERE email = ?")
        .bind(email)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Replace a subscriber's preferences blob. Returns false if unknown.
pub async fn update_preferences(
    pool: &SqlitePool,
    email: &str,
    preferences: &serde_json::Value,
) -> Result<bool> {
    let result = sqlx::query("UPDATE subscribers SET preferences = ? WHERE email = ?")
        .bind(preferences.to_string())
        .bind(email)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Delete a subscriber row outright (compliance requests)
pub async fn delete_subscriber(pool: &SqlitePool, email: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM subscribers WHERE email = ?")
        .bind(email)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// List all subscribers, newest first
pub async fn list_subscribers(pool: &SqlitePool) -> Result<Vec<Subscriber>> {
    let rows = sqlx::query("SELECT * FROM subscribers ORDER BY subscribed_at DESC")
        .fetch_all(pool)
        .await?;
    Ok(rows.iter().map(row_to_subscriber).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_tables;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");
        init_tables(&pool).await.expect("Failed to init tables");
        pool
    }

    #[tokio::test]
    async fn test_signup_dedup_and_reactivate() {
        let pool = test_pool().await;
        let tags = vec!["blog".to_string()];

        assert_eq!(
            signup(&pool, "dancer@example.com", &tags).await.unwrap(),
            SignupOutcome::Created
        );
        assert_eq!(
            signup(&pool, "dancer@example.com", &tags).await.unwrap(),
            SignupOutcome::AlreadySubscribed
        );

        assert!(unsubscribe(&pool, "dancer@example.com").await.unwrap());
        assert_eq!(
            signup(&pool, "dancer@example.com", &tags).await.unwrap(),
            SignupOutcome::Reactivated
        );

        let sub = get_subscriber(&pool, "dancer@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(sub.status, SubscriberStatus::Active);
    }

    #[tokio::test]
    async fn test_preferences_roundtrip() {
        let pool = test_pool().await;
        signup(&pool, "prefs@example.com", &[]).await.unwrap();

        let prefs = serde_json::json!({"frequency": "weekly"});
        assert!(update_preferences(&pool, "prefs@example.com", &prefs)
            .await
            .unwrap());
        assert!(!update_preferences(&pool, "unknown@example.com", &prefs)
            .await
            .unwrap());

        let sub = get_subscriber(&pool, "prefs@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(sub.preferences, Some(prefs));
    }

    #[tokio::test]
    async fn test_delete_subscriber() {
        let pool = test_pool().await;
        signup(&pool, "gone@example.com", &[]).await.unwrap();

        assert!(delete_subscriber(&pool, "gone@example.com").await.unwrap());
        assert!(get_subscriber(&pool, "gone@example.com").await.unwrap().is_none());
    }
}
