//! Blog post database operations

use chrono::{DateTime, Utc};
use dancebeat_common::{Error, Result};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::models::{BlogPost, FaqEntry, PostStatus};

/// Partial update applied by the admin edit endpoint
#[derive(Debug, Clone, Default)]
pub struct UpdatePost {
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub featured_image: Option<String>,
    pub status: Option<PostStatus>,
}

fn row_to_post(row: &sqlx::sqlite::SqliteRow) -> Result<BlogPost> {
    let id_str: String = row.get("id");
    let tags_json: String = row.get("tags");
    let faq_json: Option<String> = row.get("faq");
    let status_str: String = row.get("status");

    let tags: Vec<String> = serde_json::from_str(&tags_json).unwrap_or_default();
    let faq: Option<Vec<FaqEntry>> = faq_json.and_then(|j| serde_json::from_str(&j).ok());

    Ok(BlogPost {
        id: Uuid::parse_str(&id_str)
            .map_err(|e| Error::Internal(format!("Bad post id in store: {}", e)))?,
        title: row.get("title"),
        slug: row.get("slug"),
        content: row.get("content"),
        excerpt: row.get("excerpt"),
        author: row.get("author"),
        character: row.get("character"),
        category: row.get("category"),
        topic: row.get("topic"),
        tags,
        featured_image: row.get("featured_image"),
        status: PostStatus::parse(&status_str).unwrap_or(PostStatus::Draft),
        faq,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        published_at: row.get("published_at"),
        view_count: row.get("view_count"),
    })
}

/// Insert a new post. A duplicate slug surfaces as a UNIQUE violation
/// (see `db::is_unique_violation`).
pub async fn create_post(pool: &SqlitePool, post: &BlogPost) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO posts (
            id, title, slug, content, excerpt, author, character, category,
            topic, tags, featured_image, status, faq,
            created_at, updated_at, published_at, view_count
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(post.id.to_string())
    .bind(&post.title)
    .bind(&post.slug)
    .bind(&post.content)
    .bind(&post.excerpt)
    .bind(&post.author)
    .bind(&post.character)
    .bind(&post.category)
    .bind(&post.topic)
    .bind(serde_json::to_string(&post.tags).unwrap_or_else(|_| "[]".to_string()))
    .bind(&post.featured_image)
    .bind(post.status.as_str())
    .bind(
        post.faq
            .as_ref()
            .and_then(|f| serde_json::to_string(f).ok()),
    )
    .bind(post.created_at)
    .bind(post.updated_at)
    .bind(post.published_at)
    .bind(post.view_count)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load a post by slug
pub async fn get_post_by_slug(pool: &SqlitePool, slug: &str) -> Result<Option<BlogPost>> {
    let row = sqlx::query("SELECT * FROM posts WHERE slug = ?")
        .bind(slug)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => Ok(Some(row_to_post(&row)?)),
        None => Ok(None),
    }
}

/// Whether a slug is already taken
pub async fn slug_exists(pool: &SqlitePool, slug: &str) -> Result<bool> {
    let row = sqlx::query("SELECT 1 FROM posts WHERE slug = ?")
        .bind(slug)
        .fetch_optional(pool)
        .await?;
    Ok(row.is_some())
}

/// List posts, newest first, optionally filtered by status
pub async fn list_posts(
    pool: &SqlitePool,
    status: Option<PostStatus>,
    limit: i64,
    offset: i64,
) -> Result<Vec<BlogPost>> {
    let rows = match status {
        Some(status) => {
            sqlx::query(
                "SELECT * FROM posts WHERE status = ? ORDER BY created_at DESC LIMIT ? OFFSET ?",
            )
            .bind(status.as_str())
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query("SELECT * FROM posts ORDER BY created_at DESC LIMIT ? OFFSET ?")
                .bind(limit)
                .bind(offset)
                .fetch_all(pool)
                .await?
        }
    };

    rows.iter().map(row_to_post).collect()
}

/// Count posts, optionally filtered by status
pub async fn count_posts(pool: &SqlitePool, status: Option<PostStatus>) -> Result<i64> {
    let count: i64 = match status {
        Some(status) => {
            sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE status = ?")
                .bind(status.as_str())
                .fetch_one(pool)
                .await?
        }
        None => {
            sqlx::query_scalar("SELECT COUNT(*) FROM posts")
                .fetch_one(pool)
                .await?
        }
    };
    Ok(count)
}

/// Apply a partial update to a post. Returns the updated post, or None if
/// the slug doesn't exist. The slug itself is never changed.
pub async fn update_post(
    pool: &SqlitePool,
    slug: &str,
    changes: &UpdatePost,
) -> Result<Option<BlogPost>> {
    let Some(mut post) = get_post_by_slug(pool, slug).await? else {
        return Ok(None);
    };

    if let Some(title) = &changes.title {
        post.title = title.clone();
    }
    if let Some(content) = &changes.content {
        post.content = content.clone();
    }
    if let Some(excerpt) = &changes.excerpt {
        post.excerpt = excerpt.clone();
    }
    if let Some(category) = &changes.category {
        post.category = category.clone();
    }
    if let Some(tags) = &changes.tags {
        post.tags = tags.clone();
    }
    if let Some(featured_image) = &changes.featured_image {
        post.featured_image = featured_image.clone();
    }
    if let Some(status) = changes.status {
        post.status = status;
        // First transition to published stamps published_at
        if status == PostStatus::Published && post.published_at.is_none() {
            post.published_at = Some(Utc::now());
        }
    }
    post.updated_at = Utc::now();

    sqlx::query(
        r#"
        UPDATE posts SET
            title = ?, content = ?, excerpt = ?, category = ?, tags = ?,
            featured_image = ?, status = ?, updated_at = ?, published_at = ?
        WHERE slug = ?
        "#,
    )
    .bind(&post.title)
    .bind(&post.content)
    .bind(&post.excerpt)
    .bind(&post.category)
    .bind(serde_json::to_string(&post.tags).unwrap_or_else(|_| "[]".to_string()))
    .bind(&post.featured_image)
    .bind(post.status.as_str())
    .bind(post.updated_at)
    .bind(post.published_at)
    .bind(slug)
    .execute(pool)
    .await?;

    Ok(Some(post))
}

/// Update just the featured image URL
pub async fn set_featured_image(pool: &SqlitePool, slug: &str, url: &str) -> Result<bool> {
    let result = sqlx::query("UPDATE posts SET featured_image = ?, updated_at = ? WHERE slug = ?")
        .bind(url)
        .bind(Utc::now())
        .bind(slug)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Delete a post row. Returns false if the slug didn't exist.
pub async fn delete_post(pool: &SqlitePool, slug: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM posts WHERE slug = ?")
        .bind(slug)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Increment a post's view counter
pub async fn increment_view_count(pool: &SqlitePool, slug: &str) -> Result<()> {
    sqlx::query("UPDATE posts SET view_count = view_count + 1 WHERE slug = ?")
        .bind(slug)
        .execute(pool)
        .await?;
    Ok(())
}

/// Distinct source topics of posts created at or after the cutoff.
///
/// Feeds the duplicate-prevention filter; manual posts (empty topic) are
/// excluded.
pub async fn topics_since(pool: &SqlitePool, cutoff: DateTime<Utc>) -> Result<Vec<String>> {
    let rows = sqlx::query_scalar::<_, String>(
        "SELECT DISTINCT topic FROM posts WHERE created_at >= ? AND topic != ''",
    )
    .bind(cutoff)
    .fetch_all(pool)
    .await?;
    Ok(rows)
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

    fn sample_post(slug: &str) -> BlogPost {
        let now = Utc::now();
        BlogPost {
            id: Uuid::new_v4(),
            title: "Test Post".to_string(),
            slug: slug.to_string(),
            content: "# Test Post\n\nBody.".to_string(),
            excerpt: "Body.".to_string(),
            author: "Marisol Vega".to_string(),
            character: "marisol".to_string(),
            category: "salsa".to_string(),
            topic: "Mastering the cross body lead".to_string(),
            tags: vec!["salsa".to_string()],
            featured_image: "https://dancebeat.example/media/blog/test.jpg".to_string(),
            status: PostStatus::Published,
            faq: None,
            created_at: now,
            updated_at: now,
            published_at: Some(now),
            view_count: 0,
        }
    }

    #[tokio::test]
    async fn test_create_and_load_roundtrip() {
        let pool = test_pool().await;
        let post = sample_post("2025-06-01-test-post");

        create_post(&pool, &post).await.expect("Failed to create post");

        let loaded = get_post_by_slug(&pool, "2025-06-01-test-post")
            .await
            .expect("Failed to load post")
            .expect("Post not found");

        assert_eq!(loaded.id, post.id);
        assert_eq!(loaded.title, "Test Post");
        assert_eq!(loaded.tags, vec!["salsa"]);
        assert_eq!(loaded.status, PostStatus::Published);
        assert_eq!(loaded.view_count, 0);
    }

    #[tokio::test]
    async fn test_duplicate_slug_is_unique_violation() {
        let pool = test_pool().await;
        create_post(&pool, &sample_post("2025-06-01-dup")).await.unwrap();

        let err = create_post(&pool, &sample_post("2025-06-01-dup"))
            .await
            .expect_err("Duplicate slug should fail");
        assert!(crate::db::is_unique_violation(&err));
    }

    #[tokio::test]
    async fn test_slug_exists() {
        let pool = test_pool().await;
        assert!(!slug_exists(&pool, "2025-06-01-nope").await.unwrap());
        create_post(&pool, &sample_post("2025-06-01-yes")).await.unwrap();
        assert!(slug_exists(&pool, "2025-06-01-yes").await.unwrap());
    }

    #[tokio::test]
    async fn test_update_post_partial() {
        let pool = test_pool().await;
        create_post(&pool, &sample_post("2025-06-01-edit")).await.unwrap();

        let changes = UpdatePost {
            title: Some("New Title".to_string()),
            tags: Some(vec!["bachata".to_string(), "music".to_string()]),
            ..Default::default()
        };
        let updated = update_post(&pool, "2025-06-01-edit", &changes)
            .await
            .unwrap()
            .expect("Post should exist");

        assert_eq!(updated.title, "New Title");
        assert_eq!(updated.tags.len(), 2);
        // Untouched fields survive
        assert_eq!(updated.category, "salsa");

        assert!(update_post(&pool, "2025-06-01-missing", &changes)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_view_count_increments() {
        let pool = test_pool().await;
        create_post(&pool, &sample_post("2025-06-01-views")).await.unwrap();

        increment_view_count(&pool, "2025-06-01-views").await.unwrap();
        increment_view_count(&pool, "2025-06-01-views").await.unwrap();

        let post = get_post_by_slug(&pool, "2025-06-01-views")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(post.view_count, 2);
    }

    #[tokio::test]
    async fn test_topics_since_window() {
        let pool = test_pool().await;

        let mut old = sample_post("2025-05-01-old");
        old.created_at = Utc::now() - chrono::Duration::hours(48);
        old.topic = "Old topic".to_string();
        create_post(&pool, &old).await.unwrap();

        let mut recent = sample_post("2025-06-01-recent");
        recent.topic = "Recent topic".to_string();
        create_post(&pool, &recent).await.unwrap();

        let cutoff = Utc::now() - chrono::Duration::hours(12);
        let topics = topics_since(&pool, cutoff).await.unwrap();
        assert_eq!(topics, vec!["Recent topic"]);
    }

    #[tokio::test]
    async fn test_list_and_count_with_status_filter() {
        let pool = test_pool().await;
        create_post(&pool, &sample_post("2025-06-01-a")).await.unwrap();

        let mut draft = sample_post("2025-06-01-b");
        draft.status = PostStatus::Draft;
        create_post(&pool, &draft).await.unwrap();

        assert_eq!(count_posts(&pool, None).await.unwrap(), 2);
        assert_eq!(count_posts(&pool, Some(PostStatus::Draft)).await.unwrap(), 1);

        let published = list_posts(&pool, Some(PostStatus::Published), 10, 0)
            .await
            .unwrap();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].slug, "2025-06-01-a");
    }

    #[tokio::test]
    async fn test_delete_post() {
        let pool = test_pool().await;
        create_post(&pool, &sample_post("2025-06-01-gone")).await.unwrap();

        assert!(delete_post(&pool, "2025-06-01-gone").await.unwrap());
        assert!(!delete_post(&pool, "2025-06-01-gone").await.unwrap());
        assert!(get_post_by_slug(&pool, "2025-06-01-gone").await.unwrap().is_none());
    }
}
