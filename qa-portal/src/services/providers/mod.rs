//! LLM provider abstractions and implementations.
//!
//! Each backend implements [`LlmProvider`] so the dispatcher can select one
//! without knowing its wire format (OpenAI chat completions, Gemini
//! generateContent).

pub mod gemini;
pub mod local;
pub mod openai;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{ModelKind, Source};

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Classify a transport failure from `reqwest`. The URL is dropped from
    /// the message since it can carry credentials.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else {
            ProviderError::Network(err.without_url().to_string())
        }
    }

    /// Classify a failure while reading or decoding a 2xx body. The request
    /// timeout also bounds the body, so a stalled stream is a timeout rather
    /// than a malformed reply.
    pub fn from_body(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else {
            ProviderError::InvalidResponse(err.without_url().to_string())
        }
    }
}

/// Per-call options.
#[derive(Debug, Clone, Default)]
pub struct CompletionOptions {
    /// Ask the provider to ground its answer in web search results.
    pub use_grounding: bool,
}

/// Normalised provider output.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderReply {
    pub text: String,
    pub sources: Vec<Source>,
}

#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Which model slot this provider fills.
    fn kind(&self) -> ModelKind;

    /// Environment variable holding the provider's credential.
    fn credential_name(&self) -> &'static str;

    fn is_configured(&self) -> bool;

    async fn complete(
        &self,
        prompt: &str,
        system_instruction: &str,
        options: &CompletionOptions,
    ) -> Result<ProviderReply, ProviderError>;
}

/// Shared HTTP client with a hard request timeout.
pub(crate) fn http_client(timeout_seconds: u64) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_seconds))
        .build()
        .map_err(|e| ProviderError::Network(format!("Failed to create HTTP client: {}", e)))
}

/// Read a non-2xx body for error reporting.
pub(crate) async fn api_error(response: reqwest::Response) -> ProviderError {
    let status = response.status().as_u16();
    match response.text().await {
        Ok(body) => ProviderError::Api { status, body },
        Err(e) if e.is_timeout() => ProviderError::Timeout,
        Err(e) => {
            let e = e.without_url();
            tracing::warn!(status, error = %e, "Failed to read provider error body");
            ProviderError::Api {
                status,
                body: format!("<unreadable body: {}>", e),
            }
        }
    }
}
