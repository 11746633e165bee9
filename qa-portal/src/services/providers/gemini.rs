//! Gemini provider implementation (secondary model).
//!
//! Calls `generateContent` with the tutor instruction as `systemInstruction`
//! and, when requested, the Google Search grounding tool. Web citations from
//! the first candidate are returned as sources.

use super::{api_error, http_client, CompletionOptions, LlmProvider, ProviderError, ProviderReply};
use crate::config::{has_secret, GeminiSettings, SECONDARY_CREDENTIAL_ENV};
use crate::models::{ModelKind, Source};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

pub const NO_CONTENT_PLACEHOLDER: &str = "No content returned by the secondary model.";

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Raw outcome of the connectivity probe.
#[derive(Debug, Clone)]
pub struct ProbeReport {
    pub status: u16,
    pub body: String,
}

/// Gemini text provider.
pub struct GeminiProvider {
    settings: GeminiSettings,
    client: Client,
}

impl GeminiProvider {
    pub fn new(settings: GeminiSettings) -> Result<Self, ProviderError> {
        let client = http_client(settings.timeout_seconds)?;
        Ok(Self { settings, client })
    }

    fn base_url(&self) -> &str {
        self.settings.base_url.trim_end_matches('/')
    }

    /// Build the API URL for the configured model and method.
    fn api_url(&self, method: &str) -> String {
        format!("{}/models/{}:{}", self.base_url(), self.settings.model, method)
    }

    fn api_key(&self) -> Result<&Secret<String>, ProviderError> {
        self.settings
            .api_key
            .as_ref()
            .filter(|_| self.is_configured())
            .ok_or_else(|| ProviderError::NotConfigured(SECONDARY_CREDENTIAL_ENV.to_string()))
    }

    /// List models to check that the endpoint and key work.
    ///
    /// Any HTTP answer is a successful probe; only transport failures and a
    /// missing key are errors.
    pub async fn probe(&self) -> Result<ProbeReport, ProviderError> {
        let api_key = self.api_key()?;

        let response = self
            .client
            .get(format!("{}/models", self.base_url()))
            .header(API_KEY_HEADER, api_key.expose_secret())
            .send()
            .await
            .map_err(ProviderError::from_transport)?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(ProviderError::from_transport)?;

        Ok(ProbeReport { status, body })
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn kind(&self) -> ModelKind {
        ModelKind::Secondary
    }

    fn credential_name(&self) -> &'static str {
        SECONDARY_CREDENTIAL_ENV
    }

    fn is_configured(&self) -> bool {
        has_secret(&self.settings.api_key)
    }

    async fn complete(
        &self,
        prompt: &str,
        system_instruction: &str,
        options: &CompletionOptions,
    ) -> Result<ProviderReply, ProviderError> {
        let api_key = self.api_key()?;

        let request = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part::text(system_instruction)],
            },
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part::text(prompt)],
            }],
            tools: if options.use_grounding {
                vec![Tool {
                    google_search: GoogleSearch {},
                }]
            } else {
                Vec::new()
            },
        };

        tracing::debug!(
            model = %self.settings.model,
            prompt_len = prompt.len(),
            grounding = options.use_grounding,
            "Sending request to Gemini API"
        );

        let response = self
            .client
            .post(self.api_url("generateContent"))
            .header(API_KEY_HEADER, api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(ProviderError::from_transport)?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let api_response: GenerateContentResponse = response
            .json()
            .await
            .map_err(ProviderError::from_body)?;

        let candidate = api_response.candidates.first();
        if let Some(reason) = candidate.and_then(|c| c.finish_reason.as_deref()) {
            if reason != "STOP" {
                tracing::warn!(finish_reason = %reason, "Gemini stopped early");
            }
        }

        Ok(ProviderReply {
            text: candidate
                .and_then(Candidate::first_text)
                .unwrap_or(NO_CONTENT_PLACEHOLDER)
                .to_string(),
            sources: candidate.map(Candidate::sources).unwrap_or_default(),
        })
    }
}

// ============================================================================
// Gemini API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

impl Part {
    fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
    #[serde(default)]
    grounding_attributions: Option<Vec<GroundingAttribution>>,
    #[serde(default)]
    grounding_metadata: Option<GroundingMetadata>,
}

/// An attribution either nests its link under `web` or carries it inline.
#[derive(Debug, Deserialize)]
struct GroundingAttribution {
    #[serde(default)]
    web: Option<WebSource>,
    #[serde(default)]
    uri: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    #[serde(default)]
    web: Option<WebSource>,
}

#[derive(Debug, Deserialize)]
struct WebSource {
    #[serde(default)]
    uri: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

impl Candidate {
    fn first_text(&self) -> Option<&str> {
        self.content
            .as_ref()
            .and_then(|c| c.parts.first())
            .and_then(|p| p.text.as_deref())
            .filter(|text| !text.trim().is_empty())
    }

    /// Web citations in attribution order. The attribution list wins; the
    /// grounding-chunk list is only read when no attribution list is present.
    fn sources(&self) -> Vec<Source> {
        let links: Vec<(Option<&str>, Option<&str>)> = match &self.grounding_attributions {
            Some(attributions) => attributions
                .iter()
                .map(|a| match &a.web {
                    Some(web) => (web.uri.as_deref(), web.title.as_deref()),
                    None => (a.uri.as_deref(), a.title.as_deref()),
                })
                .collect(),
            None => self
                .grounding_metadata
                .iter()
                .flat_map(|m| m.grounding_chunks.iter())
                .filter_map(|chunk| chunk.web.as_ref())
                .map(|web| (web.uri.as_deref(), web.title.as_deref()))
                .collect(),
        };

        links
            .into_iter()
            .filter_map(|(uri, title)| {
                let uri = uri.map(str::trim).filter(|u| !u.is_empty())?;
                let title = title.map(str::trim).filter(|t| !t.is_empty()).unwrap_or(uri);
                Some(Source {
                    uri: uri.to_string(),
                    title: title.to_string(),
                })
            })
            .collect()
    }
}
