//! Database access for the blog service
//!
//! SQLite via sqlx. Slug and email uniqueness are enforced by UNIQUE
//! constraints; writers probe first and let the constraint close the
//! probe-to-insert race.

pub mod posts;
pub mod subscribers;

use dancebeat_common::Result;
use sqlx::SqlitePool;
use std::path::Path;

/// Initialize database connection pool
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // SQLite URI with mode=rwc (read, write, create)
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;

    init_tables(&pool).await?;

    Ok(pool)
}

/// Create blog service tables if they don't exist.
///
/// Public so integration tests can initialize in-memory pools.
pub async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS posts (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            slug TEXT NOT NULL UNIQUE,
            content TEXT NOT NULL,
            excerpt TEXT NOT NULL DEFAULT '',
            author TEXT NOT NULL DEFAULT '',
            character TEXT NOT NULL DEFAULT '',
            category TEXT NOT NULL DEFAULT '',
            topic TEXT NOT NULL DEFAULT '',
            tags TEXT NOT NULL DEFAULT '[]',
            featured_image TEXT NOT NULL DEFAULT '',
            status TEXT NOT NULL DEFAULT 'published',
            faq TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            published_at TEXT,
            view_count INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_posts_created_at ON posts(created_at)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_posts_status ON posts(status)")
        .execute(pool)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS subscribers (
            email TEXT PRIMARY KEY,
            status TEXT NOT NULL DEFAULT 'active',
            subscribed_at TEXT NOT NULL,
            tags TEXT NOT NULL DEFAULT '[]',
            preferences TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Database tables initialized (posts, subscribers)");

    Ok(())
}

/// Whether an error is a UNIQUE constraint violation (duplicate slug/email)
pub fn is_unique_violation(err: &dancebeat_common::Error) -> bool {
    match err {
        dancebeat_common::Error::Database(sqlx::Error::Database(db_err)) => {
            db_err.is_unique_violation()
        }
        _ => false,
    }
}
