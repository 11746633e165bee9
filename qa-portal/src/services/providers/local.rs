//! Degraded "local" answer used when no provider can serve a request.

use crate::models::{GenerateResult, ModelKind};

pub const NO_VALID_PROVIDER_MESSAGE: &str =
    "Local mode: no valid model provider was selected. Choose \"primary\" or \"secondary\".";

/// Local result naming the credential the requested provider lacks.
pub fn missing_credential(credential_name: &str) -> GenerateResult {
    local_result(format!(
        "Local mode: {} is not configured, so the requested model is unavailable.",
        credential_name
    ))
}

/// Local result for a model choice that names no known provider.
pub fn unrecognized_choice() -> GenerateResult {
    local_result(NO_VALID_PROVIDER_MESSAGE.to_string())
}

fn local_result(result: String) -> GenerateResult {
    GenerateResult {
        result,
        model: ModelKind::Local,
        sources: Vec::new(),
    }
}
