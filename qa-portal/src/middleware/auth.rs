use axum::{
    body::Body,
    http::{Request, Uri},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::SessionState;

/// Redirect to the login page, carrying the requested path so the caller
/// resumes there after signing in.
pub fn login_redirect(uri: &Uri) -> Redirect {
    let next = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    match serde_urlencoded::to_string([("next", next)]) {
        Ok(query) => Redirect::to(&format!("/login?{}", query)),
        Err(_) => Redirect::to("/login"),
    }
}

/// Session gate for protected routes.
pub async fn auth_middleware(session: Session, request: Request<Body>, next: Next) -> Response {
    match SessionState::load(&session).await {
        Ok(Some(_)) => next.run(request).await,
        Ok(None) => login_redirect(request.uri()).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to read session, treating caller as signed out");
            login_redirect(request.uri()).into_response()
        }
    }
}
