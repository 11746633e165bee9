use askama::Template;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use secrecy::Secret;
use serde::Deserialize;
use service_core::error::AppError;
use tower_sessions::Session;

use crate::services::Credentials;
use crate::AppState;

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    /// Post-login destination carried through the form action.
    pub next: Option<String>,
    pub error: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct LoginQuery {
    pub next: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Only same-site absolute paths are followed after login.
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path
        }
        _ => "/",
    }
}

pub async fn login_page(Query(query): Query<LoginQuery>) -> impl IntoResponse {
    LoginTemplate {
        next: query.next,
        error: None,
    }
}

pub async fn login_handler(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<LoginQuery>,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let credentials = Credentials {
        username: form.username,
        password: Secret::new(form.password),
    };

    match state.authenticator.authenticate(&credentials) {
        Ok(session_state) => {
            // New id on privilege change.
            session
                .cycle_id()
                .await
                .map_err(|e| AppError::InternalError(e.into()))?;
            session_state
                .store(&session)
                .await
                .map_err(|e| AppError::InternalError(e.into()))?;

            tracing::info!(username = %session_state.username, "User logged in");

            let target = safe_next(query.next.as_deref());
            Ok(Redirect::to(target).into_response())
        }
        Err(e) => {
            tracing::warn!(username = %credentials.username, "Rejected login attempt");
            Ok((
                StatusCode::UNAUTHORIZED,
                LoginTemplate {
                    next: query.next,
                    error: Some(e.to_string()),
                },
            )
                .into_response())
        }
    }
}

pub async fn logout_handler(session: Session) -> Result<Redirect, AppError> {
    session
        .flush()
        .await
        .map_err(|e| AppError::InternalError(e.into()))?;

    Ok(Redirect::to("/login"))
}
