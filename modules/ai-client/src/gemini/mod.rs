mod client;
pub(crate) mod types;

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{AiError, Result};
use crate::traits::TextModel;
use client::GeminiClient;
use types::GenerateRequest;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

// =============================================================================
// Gemini Agent
// =============================================================================

pub struct Gemini {
    model: String,
    client: GeminiClient,
}

impl Gemini {
    pub fn with_timeout(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(AiError::Config("Gemini API key is empty".into()));
        }
        Ok(Self {
            model: model.into(),
            client: GeminiClient::new(&api_key, timeout)?,
        })
    }

    pub fn with_base_url(mut self, url: impl AsRef<str>) -> Self {
        self.client = self.client.with_base_url(url.as_ref());
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl TextModel for Gemini {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = GenerateRequest::prompt(prompt);
        let response = self.client.generate(&self.model, &request).await?;

        match response.text() {
            Some(text) => {
                debug!(chars = text.len(), "Gemini completion received");
                Ok(text)
            }
            None => Err(AiError::EmptyResponse(response.empty_reason())),
        }
    }
}
