//! Disk-backed media storage for featured images
//!
//! Stored assets live under `{root_folder}/media/blog/` and are served
//! statically at `{site_base_url}/media/...`. Upload and generated images
//! are normalized to 1200x630 JPEG (the standard social-card aspect).

use dancebeat_common::{Error, Result};
use image::imageops::FilterType;
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Social-card dimensions every stored image is normalized to
pub const CARD_WIDTH: u32 = 1200;
pub const CARD_HEIGHT: u32 = 630;

const JPEG_QUALITY: u8 = 85;

/// Media store rooted at the service's media directory
#[derive(Debug, Clone)]
pub struct MediaStore {
    media_dir: PathBuf,
    /// Public URL prefix assets are served under, e.g.
    /// `https://dancebeat.example/media`
    public_base: String,
}

impl MediaStore {
    pub fn new(media_dir: PathBuf, site_base_url: &str) -> Self {
        Self {
            media_dir,
            public_base: format!("{}/media", site_base_url.trim_end_matches('/')),
        }
    }

    /// Directory served by the static file layer
    pub fn media_dir(&self) -> &Path {
        &self.media_dir
    }

    /// Re-encode arbitrary image bytes as a 1200x630 cover-cropped JPEG
    pub fn normalize_to_card(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| Error::InvalidInput(format!("Unrecognized image data: {}", e)))?;

        let resized = decoded.resize_to_fill(CARD_WIDTH, CARD_HEIGHT, FilterType::Lanczos3);

        let mut out = Vec::new();
        let mut encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(Cursor::new(&mut out), JPEG_QUALITY);
        encoder
            .encode_image(&resized)
            .map_err(|e| Error::Internal(format!("JPEG encode failed: {}", e)))?;

        Ok(out)
    }

    /// Store already-encoded JPEG bytes for a post and return the public URL
    pub fn store_post_image(&self, slug: &str, jpeg_bytes: &[u8]) -> Result<String> {
        let dir = self.media_dir.join("blog");
        std::fs::create_dir_all(&dir)?;

        let filename = format!("{}.jpg", slug);
        std::fs::write(dir.join(&filename), jpeg_bytes)?;

        let url = format!("{}/blog/{}", self.public_base, filename);
        tracing::info!(slug = %slug, url = %url, "Stored post image");
        Ok(url)
    }

    /// Whether a URL points at an asset this store manages
    pub fn is_managed_url(&self, url: &str) -> bool {
        url.starts_with(&self.public_base)
    }

    /// Delete the stored asset behind a managed URL.
    ///
    /// A missing file counts as already deleted; any other IO failure is an
    /// error (post deletion is fail-closed on cleanup errors).
    pub fn delete_by_url(&self, url: &str) -> Result<()> {
        let relative = url
            .strip_prefix(&self.public_base)
            .ok_or_else(|| Error::InvalidInput(format!("Not a managed media URL: {}", url)))?
            .trim_start_matches('/');

        // Reject traversal out of the media dir
        if relative.split('/').any(|seg| seg == "..") {
            return Err(Error::InvalidInput(format!("Invalid media path: {}", relative)));
        }

        let path = self.media_dir.join(relative);
        match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::info!(url = %url, "Deleted stored media asset");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(url = %url, "Media asset already gone");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Procedural placeholder card: a deterministic two-tone gradient
    /// derived from the slug. Tier-2 fallback when image generation fails.
    pub fn placeholder_card(&self, slug: &str) -> Result<Vec<u8>> {
        let seed: u32 = slug.bytes().fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32));

        let top = [
            (seed % 160 + 40) as u8,
            ((seed >> 8) % 120 + 30) as u8,
            ((seed >> 16) % 160 + 60) as u8,
        ];
        let bottom = [
            ((seed >> 4) % 80 + 10) as u8,
            ((seed >> 12) % 60 + 10) as u8,
            ((seed >> 20) % 100 + 30) as u8,
        ];

        let img = image::RgbImage::from_fn(CARD_WIDTH, CARD_HEIGHT, |_, y| {
            let t = y as f32 / CARD_HEIGHT as f32;
            let mix = |a: u8, b: u8| (a as f32 * (1.0 - t) + b as f32 * t) as u8;
            image::Rgb([mix(top[0], bottom[0]), mix(top[1], bottom[1]), mix(top[2], bottom[2])])
        });

        let mut out = Vec::new();
        let mut encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(Cursor::new(&mut out), JPEG_QUALITY);
        encoder
            .encode_image(&image::DynamicImage::ImageRgb8(img))
            .map_err(|e| Error::Internal(format!("JPEG encode failed: {}", e)))?;

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, MediaStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = MediaStore::new(dir.path().to_path_buf(), "https://dancebeat.example");
        (dir, store)
    }

    #[test]
    fn test_store_and_delete_roundtrip() {
        let (_dir, store) = store();
        let jpeg = store.placeholder_card("2025-06-01-test").unwrap();

        let url = store.store_post_image("2025-06-01-test", &jpeg).unwrap();
        assert_eq!(url, "https://dancebeat.example/media/blog/2025-06-01-test.jpg");
        assert!(store.is_managed_url(&url));
        assert!(store.media_dir().join("blog/2025-06-01-test.jpg").exists());

        store.delete_by_url(&url).unwrap();
        assert!(!store.media_dir().join("blog/2025-06-01-test.jpg").exists());
    }

    #[test]
    fn test_delete_missing_file_is_ok() {
        let (_dir, store) = store();
        store
            .delete_by_url("https://dancebeat.example/media/blog/never-existed.jpg")
            .unwrap();
    }

    #[test]
    fn test_external_urls_not_managed() {
        let (_dir, store) = store();
        assert!(!store.is_managed_url("https://cdn.elsewhere.com/image.jpg"));
        assert!(store.delete_by_url("https://cdn.elsewhere.com/image.jpg").is_err());
    }

    #[test]
    fn test_traversal_rejected() {
        let (_dir, store) = store();
        assert!(store
            .delete_by_url("https://dancebeat.example/media/../../etc/passwd")
            .is_err());
    }

    #[test]
    fn test_normalize_produces_card_dimensions() {
        let (_dir, store) = store();
        // A placeholder card is already valid image input
        let src = store.placeholder_card("seed").unwrap();
        let normalized = store.normalize_to_card(&src).unwrap();

        let decoded = image::load_from_memory(&normalized).unwrap();
        assert_eq!(decoded.width(), CARD_WIDTH);
        assert_eq!(decoded.height(), CARD_HEIGHT);
    }

    #[test]
    fn test_normalize_rejects_garbage() {
        let (_dir, store) = store();
        assert!(store.normalize_to_card(b"not an image").is_err());
    }

    #[test]
    fn test_placeholder_deterministic() {
        let (_dir, store) = store();
        assert_eq!(
            store.placeholder_card("same-slug").unwrap(),
            store.placeholder_card("same-slug").unwrap()
        );
    }
}
