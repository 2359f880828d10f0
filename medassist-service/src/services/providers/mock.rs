//! Mock provider for testing.

use super::{ProviderError, TextProvider};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Mock text provider that either echoes a canned reply or always fails.
pub struct MockTextProvider {
    reply: Option<String>,
    calls: AtomicUsize,
}

impl MockTextProvider {
    /// A provider that answers every prompt with `reply`.
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: Some(reply.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// A provider whose every call fails.
    pub fn failing() -> Self {
        Self {
            reply: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `generate` calls seen so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextProvider for MockTextProvider {
    async fn generate(
        &self,
        _system_prompt: &str,
        _user_text: &str,
    ) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match &self.reply {
            Some(reply) => Ok(reply.clone()),
            None => Err(ProviderError::ApiError(
                "Mock provider configured to fail".to_string(),
            )),
        }
    }
}
