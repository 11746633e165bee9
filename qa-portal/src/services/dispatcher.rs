//! Request validation and provider selection for `/generate`.

use service_core::error::AppError;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

use super::metrics::record_generate;
use super::prompt;
use super::providers::{local, CompletionOptions, LlmProvider, ProviderError};
use crate::models::{GenerateRequest, GenerateResult, ModelKind};

/// Longest slice of a provider error body passed back to the caller.
const MAX_UPSTREAM_ERROR_CHARS: usize = 500;

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Prompt is required.")]
    EmptyPrompt,

    #[error("The {provider} model timed out. Please try again in a moment.")]
    UpstreamTimeout { provider: ModelKind },

    #[error("{provider} model request failed: {message}")]
    UpstreamFailure { provider: ModelKind, message: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl DispatchError {
    fn outcome(&self) -> &'static str {
        match self {
            DispatchError::EmptyPrompt => "client_error",
            DispatchError::UpstreamTimeout { .. } => "timeout",
            DispatchError::UpstreamFailure { .. } => "upstream_error",
            DispatchError::Internal(_) => "internal_error",
        }
    }
}

impl From<DispatchError> for AppError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::EmptyPrompt => AppError::BadRequest(err.to_string()),
            DispatchError::UpstreamTimeout { .. } => AppError::GatewayTimeout(err.to_string()),
            DispatchError::UpstreamFailure { .. } => AppError::BadGateway(err.to_string()),
            DispatchError::Internal(e) => AppError::InternalError(e),
        }
    }
}

/// Routes a generate request to the primary or secondary provider, or answers
/// locally when the requested provider cannot be used.
pub struct ProviderDispatcher {
    primary: Arc<dyn LlmProvider>,
    secondary: Arc<dyn LlmProvider>,
}

impl ProviderDispatcher {
    pub fn new(primary: Arc<dyn LlmProvider>, secondary: Arc<dyn LlmProvider>) -> Self {
        Self { primary, secondary }
    }

    fn provider(&self, kind: ModelKind) -> Option<&Arc<dyn LlmProvider>> {
        match kind {
            ModelKind::Primary => Some(&self.primary),
            ModelKind::Secondary => Some(&self.secondary),
            ModelKind::Local => None,
        }
    }

    pub async fn dispatch(&self, req: &GenerateRequest) -> Result<GenerateResult, DispatchError> {
        let started = Instant::now();
        let result = self.dispatch_inner(req).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(res) => {
                record_generate(res.model.as_str(), "ok");
                tracing::info!(
                    model = %res.model,
                    grounding = req.use_grounding,
                    sources = res.sources.len(),
                    elapsed_ms,
                    "Generate request completed"
                );
            }
            Err(e) => {
                let model = req.model_choice.kind().unwrap_or(ModelKind::Local);
                record_generate(model.as_str(), e.outcome());
                match e {
                    DispatchError::EmptyPrompt => {
                        tracing::debug!("Rejected generate request with empty prompt")
                    }
                    DispatchError::Internal(err) => {
                        tracing::error!(error = ?err, elapsed_ms, "Generate request failed")
                    }
                    _ => tracing::warn!(error = %e, elapsed_ms, "Generate request failed"),
                }
            }
        }

        result
    }

    async fn dispatch_inner(&self, req: &GenerateRequest) -> Result<GenerateResult, DispatchError> {
        let prompt = req.prompt.trim();
        if prompt.is_empty() {
            return Err(DispatchError::EmptyPrompt);
        }

        let system_instruction = prompt::compose(prompt, req.system_instruction.as_deref());

        let Some(provider) = req.model_choice.kind().and_then(|k| self.provider(k)) else {
            tracing::warn!(model_choice = ?req.model_choice, "Unrecognized model choice");
            return Ok(local::unrecognized_choice());
        };

        if !provider.is_configured() {
            tracing::warn!(
                provider = %provider.kind(),
                credential = provider.credential_name(),
                "Requested provider has no credential, answering locally"
            );
            return Ok(local::missing_credential(provider.credential_name()));
        }

        let options = CompletionOptions {
            use_grounding: req.use_grounding,
        };

        match provider.complete(prompt, &system_instruction, &options).await {
            Ok(reply) => Ok(GenerateResult {
                result: reply.text,
                model: provider.kind(),
                sources: reply.sources,
            }),
            Err(e) => Err(classify(provider.as_ref(), e)),
        }
    }
}

fn classify(provider: &dyn LlmProvider, err: ProviderError) -> DispatchError {
    let kind = provider.kind();
    match err {
        ProviderError::Timeout => DispatchError::UpstreamTimeout { provider: kind },
        ProviderError::Network(message) | ProviderError::InvalidResponse(message) => {
            DispatchError::UpstreamFailure {
                provider: kind,
                message,
            }
        }
        ProviderError::Api { status, body } => DispatchError::UpstreamFailure {
            provider: kind,
            message: format!(
                "HTTP {}: {}",
                status,
                body.chars().take(MAX_UPSTREAM_ERROR_CHARS).collect::<String>()
            ),
        },
        ProviderError::NotConfigured(name) => DispatchError::Internal(anyhow::anyhow!(
            "{} provider lost its credential {} mid-request",
            kind,
            name
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ModelChoice, Source};
    use crate::services::providers::ProviderReply;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    enum Behavior {
        Reply(ProviderReply),
        Timeout,
        Api(u16, &'static str),
        Network(&'static str),
    }

    struct FakeProvider {
        kind: ModelKind,
        configured: bool,
        behavior: Behavior,
        calls: AtomicUsize,
        last_instruction: Mutex<Option<String>>,
    }

    impl FakeProvider {
        fn new(kind: ModelKind, configured: bool, behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                kind,
                configured,
                behavior,
                calls: AtomicUsize::new(0),
                last_instruction: Mutex::new(None),
            })
        }

        fn replying(kind: ModelKind, text: &str, sources: Vec<Source>) -> Arc<Self> {
            Self::new(
                kind,
                true,
                Behavior::Reply(ProviderReply {
                    text: text.to_string(),
                    sources,
                }),
            )
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LlmProvider for FakeProvider {
        fn kind(&self) -> ModelKind {
            self.kind
        }

        fn credential_name(&self) -> &'static str {
            match self.kind {
                ModelKind::Primary => "OPENAI_API_KEY",
                _ => "GEMINI_API_KEY",
            }
        }

        fn is_configured(&self) -> bool {
            self.configured
        }

        async fn complete(
            &self,
            _prompt: &str,
            system_instruction: &str,
            _options: &CompletionOptions,
        ) -> Result<ProviderReply, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_instruction.lock().unwrap() = Some(system_instruction.to_string());
            match &self.behavior {
                Behavior::Reply(reply) => Ok(reply.clone()),
                Behavior::Timeout => Err(ProviderError::Timeout),
                Behavior::Api(status, body) => Err(ProviderError::Api {
                    status: *status,
                    body: body.to_string(),
                }),
                Behavior::Network(msg) => Err(ProviderError::Network(msg.to_string())),
            }
        }
    }

    fn request(prompt: &str, choice: ModelChoice) -> GenerateRequest {
        GenerateRequest {
            prompt: prompt.to_string(),
            model_choice: choice,
            ..Default::default()
        }
    }

    fn unconfigured(kind: ModelKind) -> Arc<FakeProvider> {
        FakeProvider::new(kind, false, Behavior::Timeout)
    }

    #[tokio::test]
    async fn empty_prompt_is_rejected_before_any_call() {
        let primary = FakeProvider::replying(ModelKind::Primary, "x", vec![]);
        let secondary = FakeProvider::replying(ModelKind::Secondary, "y", vec![]);
        let dispatcher = ProviderDispatcher::new(primary.clone(), secondary.clone());

        for prompt in ["", "   \n\t"] {
            let err = dispatcher
                .dispatch(&request(prompt, ModelChoice::Primary))
                .await
                .unwrap_err();
            assert!(matches!(err, DispatchError::EmptyPrompt));
        }
        assert_eq!(primary.calls() + secondary.calls(), 0);
    }

    #[tokio::test]
    async fn configured_provider_answers_with_its_own_model() {
        let primary = FakeProvider::replying(ModelKind::Primary, "def reverse(s): return s[::-1]", vec![]);
        let secondary = FakeProvider::replying(ModelKind::Secondary, "gemini", vec![]);
        let dispatcher = ProviderDispatcher::new(primary.clone(), secondary.clone());

        let result = dispatcher
            .dispatch(&request("Write python code to reverse a string", ModelChoice::Primary))
            .await
            .unwrap();
        assert_eq!(result.model, ModelKind::Primary);
        assert_eq!(result.result, "def reverse(s): return s[::-1]");
        assert!(result.sources.is_empty());

        let result = dispatcher
            .dispatch(&request("hello", ModelChoice::Secondary))
            .await
            .unwrap();
        assert_eq!(result.model, ModelKind::Secondary);
        assert_eq!(primary.calls(), 1);
        assert_eq!(secondary.calls(), 1);
    }

    #[tokio::test]
    async fn composed_instruction_reaches_the_provider() {
        let primary = FakeProvider::replying(ModelKind::Primary, "ok", vec![]);
        let dispatcher = ProviderDispatcher::new(primary.clone(), unconfigured(ModelKind::Secondary));

        let mut req = request("sql joins", ModelChoice::Primary);
        req.system_instruction = Some("Be brief.".to_string());
        dispatcher.dispatch(&req).await.unwrap();

        let instruction = primary.last_instruction.lock().unwrap().clone().unwrap();
        assert_eq!(instruction, prompt::compose("sql joins", Some("Be brief.")));
    }

    #[tokio::test]
    async fn missing_credential_answers_locally_without_calling() {
        let primary = unconfigured(ModelKind::Primary);
        let secondary = unconfigured(ModelKind::Secondary);
        let dispatcher = ProviderDispatcher::new(primary.clone(), secondary.clone());

        let result = dispatcher
            .dispatch(&request("hello", ModelChoice::Primary))
            .await
            .unwrap();
        assert_eq!(result.model, ModelKind::Local);
        assert!(result.result.contains("OPENAI_API_KEY"));

        let result = dispatcher
            .dispatch(&request("hello", ModelChoice::Secondary))
            .await
            .unwrap();
        assert_eq!(result.model, ModelKind::Local);
        assert!(result.result.contains("GEMINI_API_KEY"));

        assert_eq!(primary.calls() + secondary.calls(), 0);
    }

    #[tokio::test]
    async fn unrecognized_choice_answers_locally() {
        let primary = FakeProvider::replying(ModelKind::Primary, "x", vec![]);
        let dispatcher = ProviderDispatcher::new(primary.clone(), unconfigured(ModelKind::Secondary));

        let result = dispatcher
            .dispatch(&request("hello", ModelChoice::parse("claude")))
            .await
            .unwrap();
        assert_eq!(result.model, ModelKind::Local);
        assert_eq!(result.result, local::NO_VALID_PROVIDER_MESSAGE);
        assert_eq!(primary.calls(), 0);
    }

    #[tokio::test]
    async fn provider_errors_are_classified() {
        let cases: Vec<(Behavior, fn(&DispatchError) -> bool)> = vec![
            (Behavior::Timeout, |e| {
                matches!(e, DispatchError::UpstreamTimeout { provider: ModelKind::Secondary })
            }),
            (Behavior::Api(429, "quota exceeded"), |e| {
                matches!(e, DispatchError::UpstreamFailure { message, .. } if message == "HTTP 429: quota exceeded")
            }),
            (Behavior::Network("connection refused"), |e| {
                matches!(e, DispatchError::UpstreamFailure { message, .. } if message == "connection refused")
            }),
        ];

        for (behavior, check) in cases {
            let secondary = FakeProvider::new(ModelKind::Secondary, true, behavior);
            let dispatcher = ProviderDispatcher::new(unconfigured(ModelKind::Primary), secondary);
            let err = dispatcher
                .dispatch(&request("hello", ModelChoice::Secondary))
                .await
                .unwrap_err();
            assert!(check(&err), "unexpected classification: {err:?}");
        }
    }

    #[tokio::test]
    async fn errors_map_to_http_taxonomy() {
        use axum::http::StatusCode;

        let cases = [
            (DispatchError::EmptyPrompt, StatusCode::BAD_REQUEST),
            (
                DispatchError::UpstreamTimeout { provider: ModelKind::Secondary },
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (
                DispatchError::UpstreamFailure {
                    provider: ModelKind::Primary,
                    message: "boom".to_string(),
                },
                StatusCode::BAD_GATEWAY,
            ),
            (
                DispatchError::Internal(anyhow::anyhow!("bug")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).status_code(), status);
        }
    }

    #[tokio::test]
    async fn identical_requests_give_identical_results() {
        let sources = vec![
            Source { uri: "https://a.test".into(), title: "A".into() },
            Source { uri: "https://b.test".into(), title: "https://b.test".into() },
        ];
        let secondary = FakeProvider::replying(ModelKind::Secondary, "answer", sources);
        let dispatcher = ProviderDispatcher::new(unconfigured(ModelKind::Primary), secondary);

        let req = request("python decorators", ModelChoice::Secondary);
        let first = dispatcher.dispatch(&req).await.unwrap();
        let second = dispatcher.dispatch(&req).await.unwrap();
        assert_eq!(first, second);
    }
}
