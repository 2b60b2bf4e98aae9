//! External service clients and media storage
//!
//! Every client is constructed explicitly and injected through `AppState`
//! so tests can substitute doubles for the network-facing pieces.

pub mod image_client;
pub mod llm_client;
pub mod media_store;
pub mod og;
pub mod telegram;

pub use image_client::{ImageApiClient, ImageError, ImageGenerator};
pub use llm_client::{LlmClient, LlmError, TextGenerator};
pub use media_store::MediaStore;
pub use telegram::{NotifyEvent, TelegramNotifier};
