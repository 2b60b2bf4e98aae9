//! Generation orchestrator
//!
//! Each step is a blocking external call with no retry. Text generation
//! and persistence failures fail the whole request; the image chain
//! degrades through three tiers; notifications are fire-and-forget.

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use dancebeat_common::slug::make_unique_slug;

use crate::catalog::{self, Persona, TopicCategory};
use crate::db;
use crate::generation::{faq, seo};
use crate::models::{BlogPost, PostStatus};
use crate::rotation;
use crate::services::llm_client::LlmError;
use crate::services::og;
use crate::services::telegram::NotifyEvent;
use crate::AppState;

const EXCERPT_MAX_LEN: usize = 160;

/// Parameters for one generation run, all optional
#[derive(Debug, Clone, Default)]
pub struct GenerateParams {
    pub topic: Option<String>,
    pub character: Option<String>,
    pub category: Option<String>,
}

/// Generation pipeline errors
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Unknown character: {0}")]
    UnknownCharacter(String),

    #[error("Text generation failed: {0}")]
    TextGeneration(#[from] LlmError),

    #[error("Failed to persist post: {0}")]
    Store(#[from] dancebeat_common::Error),
}

/// Resolved topic/category/persona for one run
struct ResolvedSelection {
    topic: String,
    category: &'static TopicCategory,
    persona: &'static Persona,
}

/// Resolve topic (explicit > category-random > duplicate-filtered rotation)
/// and persona (explicit > rotation-derived).
async fn resolve_selection(
    state: &AppState,
    params: &GenerateParams,
) -> Result<ResolvedSelection, GenerationError> {
    let now = Utc::now();
    let (rotation_category, rotation_persona) =
        rotation::select_category_and_character(now.date_naive());

    let explicit_category = match &params.category {
        Some(name) => Some(
            catalog::category(name)
                .ok_or_else(|| GenerationError::UnknownCategory(name.clone()))?,
        ),
        None => None,
    };

    let persona = match &params.character {
        Some(key) => catalog::persona(key)
            .ok_or_else(|| GenerationError::UnknownCharacter(key.clone()))?,
        None => rotation_persona,
    };

    let (category, topic) = match (&params.topic, explicit_category) {
        (Some(topic), category) => (category.unwrap_or(rotation_category), topic.clone()),
        (None, Some(category)) => (category, catalog::random_topic(category).to_string()),
        (None, None) => {
            let pool = state.db.clone();
            rotation::pick_topic_avoiding_duplicates(now, move |cutoff| async move {
                db::posts::topics_since(&pool, cutoff).await
            })
            .await
        }
    };

    Ok(ResolvedSelection {
        topic,
        category,
        persona,
    })
}

fn article_system_prompt(persona: &Persona) -> String {
    format!(
        "You are {name}, {title} at DanceBeat, a dance community blog. \
         Your voice: {tone}. Catchphrases you sometimes drop in naturally: {phrases}. \
         You write engaging, practical articles for social dancers of all levels. \
         Always write in Markdown and start with a single `# ` title line.",
        name = persona.name,
        title = persona.title,
        tone = persona.tone,
        phrases = persona.catchphrases.join("; "),
    )
}

fn article_user_prompt(topic: &str, category: &TopicCategory) -> String {
    format!(
        "Write a blog post for the DanceBeat community about: {topic}\n\
         Category: {category}\n\
         Length: 700-1000 words. Use subheadings and concrete, practical advice. \
         If it fits the topic, end with a `## FAQ` section of 2-3 `Q:`/`A:` pairs.",
        topic = topic,
        category = category.name,
    )
}

fn seo_user_prompt(content: &str) -> String {
    format!(
        "For the blog article below, reply with exactly these four lines and nothing else:\n\
         SEO Title: <at most 60 characters>\n\
         Meta Description: <at most 160 characters>\n\
         Category: <one word>\n\
         Tags: <3-6 comma-separated tags>\n\
         \n\
         Article:\n{}",
        content
    )
}

/// Run the full generation pipeline and persist the resulting post.
pub async fn generate_post(
    state: &AppState,
    params: &GenerateParams,
) -> Result<BlogPost, GenerationError> {
    let selection = resolve_selection(state, params).await?;
    tracing::info!(
        topic = %selection.topic,
        category = %selection.category.name,
        character = %selection.persona.key,
        "Starting blog generation"
    );

    // Step 1: article text. Failure here fails the request and is reported.
    let article = match state
        .text
        .complete(
            &article_system_prompt(selection.persona),
            &article_user_prompt(&selection.topic, selection.category),
        )
        .await
    {
        Ok(text) => text,
        Err(e) => {
            tracing::error!(topic = %selection.topic, error = %e, "Article generation failed");
            state
                .notifier
                .notify(&NotifyEvent::GenerationFailed {
                    topic: selection.topic.clone(),
                    error: e.to_string(),
                })
                .await;
            return Err(e.into());
        }
    };

    // Step 2: SEO metadata. Transport failures degrade to computed
    // defaults, matching the parser's partial-result behavior.
    let metadata = match state
        .text
        .complete(
            "You extract SEO metadata from blog articles.",
            &seo_user_prompt(&article),
        )
        .await
    {
        Ok(response) => seo::parse_seo_metadata(&response),
        Err(e) => {
            tracing::warn!(error = %e, "SEO extraction failed, using computed defaults");
            seo::SeoMetadata::default()
        }
    };

    let title = seo::extract_title(&article)
        .or_else(|| metadata.title.clone())
        .unwrap_or_else(|| selection.topic.clone());

    // Step 3: unique slug, probed against the store.
    let now = Utc::now();
    let pool = state.db.clone();
    let slug = make_unique_slug(&title, now.date_naive(), move |candidate| {
        let pool = pool.clone();
        async move { db::posts::slug_exists(&pool, &candidate).await }
    })
    .await?;

    // Step 4: body cleanup and derived fields.
    let content = seo::strip_seo_artifacts(&article);
    let excerpt = metadata
        .description
        .clone()
        .unwrap_or_else(|| seo::derive_excerpt(&content, EXCERPT_MAX_LEN));
    let tags = if metadata.tags.is_empty() {
        vec![selection.category.name.to_string(), "dance".to_string()]
    } else {
        metadata.tags.clone()
    };

    // Step 5: featured image (never fatal).
    let featured_image = resolve_featured_image(state, &title, &slug, None).await;

    // Step 6: optional FAQ schema.
    let faq_entries = faq::extract_faq(&content);

    let post = BlogPost {
        id: Uuid::new_v4(),
        title,
        slug,
        content,
        excerpt,
        author: selection.persona.name.to_string(),
        character: selection.persona.key.to_string(),
        category: selection.category.name.to_string(),
        topic: selection.topic.clone(),
        tags,
        featured_image,
        status: PostStatus::Published,
        faq: faq_entries,
        created_at: now,
        updated_at: now,
        published_at: Some(now),
        view_count: 0,
    };

    // Step 7: persist. Failure fails the request.
    db::posts::create_post(&state.db, &post).await?;
    tracing::info!(slug = %post.slug, "Blog post persisted");

    // Step 8: best-effort notification.
    state
        .notifier
        .notify(&NotifyEvent::PostPublished {
            title: post.title.clone(),
            slug: post.slug.clone(),
            category: post.category.clone(),
            author: post.author.clone(),
        })
        .await;

    Ok(post)
}

/// Resolve a featured image URL through the three-tier fallback chain:
/// generated image, locally rendered placeholder card, procedural OG URL.
/// Every tier is logged; none is fatal.
pub async fn resolve_featured_image(
    state: &AppState,
    title: &str,
    slug: &str,
    prompt_override: Option<&str>,
) -> String {
    let base_url = &state.config.site_base_url;

    if state.config.disable_image_generation {
        tracing::info!(slug = %slug, "Image generation disabled, using OG fallback URL");
        return og::og_image_url(base_url, title, slug);
    }

    let default_prompt = format!(
        "Vibrant editorial photo illustration for a dance blog article titled \"{}\". \
         Social dancers mid-movement, warm stage lighting, no text overlay.",
        title
    );
    let prompt = prompt_override.unwrap_or(&default_prompt);

    // Tier 1: generated image
    match state.image.generate(prompt).await {
        Ok(bytes) => match state
            .media
            .normalize_to_card(&bytes)
            .and_then(|jpeg| state.media.store_post_image(slug, &jpeg))
        {
            Ok(url) => return url,
            Err(e) => {
                tracing::warn!(slug = %slug, error = %e, "Storing generated image failed");
            }
        },
        Err(e) => {
            tracing::warn!(slug = %slug, error = %e, "Image generation failed, trying placeholder card");
        }
    }

    // Tier 2: locally rendered placeholder card
    match state
        .media
        .placeholder_card(slug)
        .and_then(|jpeg| state.media.store_post_image(slug, &jpeg))
    {
        Ok(url) => return url,
        Err(e) => {
            tracing::warn!(slug = %slug, error = %e, "Placeholder card failed, using OG fallback URL");
        }
    }

    // Tier 3: procedural OG URL, no stored asset
    tracing::info!(slug = %slug, "Falling back to procedural OG image URL");
    og::og_image_url(base_url, title, slug)
}
