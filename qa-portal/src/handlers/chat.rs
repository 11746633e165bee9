use axum::{body::Bytes, extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::models::SessionUser;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub reply: String,
}

/// Offline chat. Always answers 200; an unreadable body counts as an empty
/// message.
pub async fn chat(State(state): State<AppState>, user: SessionUser, body: Bytes) -> Json<ChatReply> {
    let request: ChatRequest = serde_json::from_slice(&body).unwrap_or_default();
    let reply = state
        .offline
        .respond(&request.message, Some(user.display_name()));

    Json(ChatReply { reply })
}
