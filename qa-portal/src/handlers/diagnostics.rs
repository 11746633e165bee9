use axum::extract::State;
use service_core::error::AppError;

use crate::services::providers::ProviderError;
use crate::AppState;

const MAX_PROBE_BODY_CHARS: usize = 500;

/// Unauthenticated connectivity check against the secondary provider.
pub async fn secondary_probe(State(state): State<AppState>) -> Result<String, AppError> {
    match state.secondary.probe().await {
        Ok(report) => {
            let body: String = report.body.chars().take(MAX_PROBE_BODY_CHARS).collect();
            Ok(format!(
                "Secondary provider status: {}\n{}",
                report.status, body
            ))
        }
        Err(ProviderError::NotConfigured(name)) => Err(AppError::ServiceUnavailable(format!(
            "Secondary provider unavailable: {} is not configured.",
            name
        ))),
        Err(e) => {
            tracing::warn!(error = %e, "Secondary provider check failed");
            Err(AppError::BadGateway(format!(
                "secondary provider check failed: {}",
                e
            )))
        }
    }
}
