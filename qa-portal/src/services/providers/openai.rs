//! OpenAI chat-completions provider (primary model).

use super::{api_error, http_client, CompletionOptions, LlmProvider, ProviderError, ProviderReply};
use crate::config::{has_secret, OpenAiSettings, PRIMARY_CREDENTIAL_ENV};
use crate::models::ModelKind;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

pub const NO_RESPONSE_PLACEHOLDER: &str = "No response received from the primary model.";

pub struct OpenAiProvider {
    settings: OpenAiSettings,
    client: Client,
}

impl OpenAiProvider {
    pub fn new(settings: OpenAiSettings) -> Result<Self, ProviderError> {
        let client = http_client(settings.timeout_seconds)?;
        Ok(Self { settings, client })
    }

    fn api_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn kind(&self) -> ModelKind {
        ModelKind::Primary
    }

    fn credential_name(&self) -> &'static str {
        PRIMARY_CREDENTIAL_ENV
    }

    fn is_configured(&self) -> bool {
        has_secret(&self.settings.api_key)
    }

    async fn complete(
        &self,
        prompt: &str,
        system_instruction: &str,
        _options: &CompletionOptions,
    ) -> Result<ProviderReply, ProviderError> {
        let api_key = self
            .settings
            .api_key
            .as_ref()
            .filter(|_| self.is_configured())
            .ok_or_else(|| ProviderError::NotConfigured(PRIMARY_CREDENTIAL_ENV.to_string()))?;

        let request = ChatCompletionRequest {
            model: &self.settings.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_instruction,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.settings.temperature,
        };

        tracing::debug!(
            model = %self.settings.model,
            prompt_len = prompt.len(),
            "Sending request to OpenAI API"
        );

        let response = self
            .client
            .post(self.api_url())
            .bearer_auth(api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(ProviderError::from_transport)?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let api_response: ChatCompletionResponse = response
            .json()
            .await
            .map_err(ProviderError::from_body)?;

        Ok(ProviderReply {
            text: first_choice_text(&api_response)
                .unwrap_or(NO_RESPONSE_PLACEHOLDER)
                .to_string(),
            sources: Vec::new(),
        })
    }
}

fn first_choice_text(response: &ChatCompletionResponse) -> Option<&str> {
    response
        .choices
        .first()
        .and_then(|c| c.message.content.as_deref())
        .filter(|text| !text.trim().is_empty())
}

// ============================================================================
// OpenAI API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}
