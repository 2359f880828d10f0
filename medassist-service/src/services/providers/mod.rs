//! Text generation providers.
//!
//! `GeminiTextProvider` talks to Google's Gemini API; `MockTextProvider` stands in for it
//! in tests.

pub mod gemini;
pub mod mock;

use async_trait::async_trait;
use thiserror::Error;

pub use gemini::{GeminiConfig, GeminiTextProvider};
pub use mock::MockTextProvider;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Content filtered")]
    ContentFiltered,

    #[error("Empty response")]
    EmptyResponse,

    #[error("Network error: {0}")]
    NetworkError(String),
}

/// A single-shot text completion backend.
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Generate a reply to `user_text` under `system_prompt`.
    async fn generate(&self, system_prompt: &str, user_text: &str)
        -> Result<String, ProviderError>;
}
