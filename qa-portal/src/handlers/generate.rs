use axum::{body::Bytes, extract::State, Json};
use service_core::error::AppError;

use crate::models::{GenerateRequest, GenerateResult};
use crate::AppState;

/// `POST /generate`
///
/// The body is parsed by hand so malformed JSON yields the `{message}` error
/// shape with status 400 instead of axum's plain-text rejection.
pub async fn generate(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<GenerateResult>, AppError> {
    let request: GenerateRequest = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!(error = %e, "Rejected malformed generate body");
        AppError::BadRequest("Request body must be a JSON object with a prompt.".to_string())
    })?;

    let result = state.dispatcher.dispatch(&request).await?;
    Ok(Json(result))
}
