//! Blog post generation pipeline
//!
//! Linear flow per request: topic/persona resolution, article generation,
//! SEO metadata extraction, slug computation, body cleanup, the image
//! fallback chain, persistence, and a best-effort notification.

pub mod faq;
pub mod pipeline;
pub mod seo;

pub use pipeline::{generate_post, resolve_featured_image, GenerateParams, GenerationError};
