//! AI gateway: the single seam between request handlers and the text provider.
//!
//! The provider is optional. When no credential was available at startup the gateway
//! reports `NotConfigured` without touching the network; each call site decides what
//! that means for its response.

use std::sync::Arc;
use thiserror::Error;

use super::metrics::record_ai_request;
use super::providers::{ProviderError, TextProvider};

pub const SYMPTOM_SYSTEM_PROMPT: &str = "You are a careful medical symptom checker.\n\
1. Summarize the reported symptoms.\n\
2. List the most likely common causes.\n\
3. Suggest sensible self-care and say when to see a doctor or seek urgent care.\n\
End with: This is not medical advice.";

pub const EMERGENCY_SYSTEM_PROMPT: &str = "You are an emergency medical assistant.\n\
1. Acknowledge the situation.\n\
2. Give 3\u{2013}5 immediate first-aid steps.\n\
End with: This is not medical advice.";

/// Emergency reply when no provider is configured.
pub const EMERGENCY_UNAVAILABLE_TEXT: &str = "AI service unavailable. Please seek emergency help.";

/// Emergency reply when the provider call fails.
pub const EMERGENCY_ERROR_TEXT: &str = "AI error. Please call emergency services.";

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("AI provider not configured")]
    NotConfigured,

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Which call site a request comes from; used for metrics and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assistant {
    Symptoms,
    Emergency,
}

impl Assistant {
    pub fn as_str(self) -> &'static str {
        match self {
            Assistant::Symptoms => "symptoms",
            Assistant::Emergency => "emergency",
        }
    }

    pub fn system_prompt(self) -> &'static str {
        match self {
            Assistant::Symptoms => SYMPTOM_SYSTEM_PROMPT,
            Assistant::Emergency => EMERGENCY_SYSTEM_PROMPT,
        }
    }
}

#[derive(Clone, Default)]
pub struct AiGateway {
    provider: Option<Arc<dyn TextProvider>>,
}

impl AiGateway {
    pub fn new(provider: Option<Arc<dyn TextProvider>>) -> Self {
        Self { provider }
    }

    /// A gateway with no provider behind it.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    /// Run one completion for `assistant` and record its outcome.
    pub async fn generate(
        &self,
        assistant: Assistant,
        user_text: &str,
    ) -> Result<String, GatewayError> {
        let Some(provider) = &self.provider else {
            record_ai_request(assistant.as_str(), "not_configured");
            return Err(GatewayError::NotConfigured);
        };

        match provider.generate(assistant.system_prompt(), user_text).await {
            Ok(text) => {
                record_ai_request(assistant.as_str(), "success");
                Ok(text)
            }
            Err(e) => {
                record_ai_request(assistant.as_str(), "error");
                tracing::error!(
                    assistant = assistant.as_str(),
                    error = %e,
                    "AI provider call failed"
                );
                Err(e.into())
            }
        }
    }

    /// Emergency guidance. Never fails: provider trouble turns into a fixed safety text.
    pub async fn emergency_reply(&self, message: &str) -> String {
        match self.generate(Assistant::Emergency, message).await {
            Ok(text) => text,
            Err(GatewayError::NotConfigured) => EMERGENCY_UNAVAILABLE_TEXT.to_string(),
            Err(GatewayError::Provider(_)) => EMERGENCY_ERROR_TEXT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::MockTextProvider;

    #[tokio::test]
    async fn disabled_gateway_reports_not_configured() {
        let gateway = AiGateway::disabled();
        assert!(!gateway.is_configured());
        let result = gateway.generate(Assistant::Symptoms, "headache").await;
        assert!(matches!(result, Err(GatewayError::NotConfigured)));
    }

    #[tokio::test]
    async fn provider_failure_is_typed() {
        let gateway = AiGateway::new(Some(Arc::new(MockTextProvider::failing())));
        let result = gateway.generate(Assistant::Symptoms, "headache").await;
        assert!(matches!(result, Err(GatewayError::Provider(_))));
    }

    #[tokio::test]
    async fn emergency_reply_falls_back() {
        assert_eq!(
            AiGateway::disabled().emergency_reply("help").await,
            EMERGENCY_UNAVAILABLE_TEXT
        );

        let failing = AiGateway::new(Some(Arc::new(MockTextProvider::failing())));
        assert_eq!(failing.emergency_reply("help").await, EMERGENCY_ERROR_TEXT);

        let working = AiGateway::new(Some(Arc::new(MockTextProvider::replying("Stay calm."))));
        assert_eq!(working.emergency_reply("help").await, "Stay calm.");
    }

    #[test]
    fn emergency_prompt_ends_with_disclaimer() {
        assert!(EMERGENCY_SYSTEM_PROMPT.ends_with("End with: This is not medical advice."));
        assert!(EMERGENCY_SYSTEM_PROMPT.contains("3\u{2013}5 immediate first-aid steps"));
    }
}
