use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::middleware::auth::login_redirect;

pub const LOGGED_IN_KEY: &str = "logged_in";
pub const USERNAME_KEY: &str = "username";

/// Per-caller state held in the session store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub logged_in: bool,
    pub username: String,
}

impl SessionState {
    /// Read the state from a session; `None` when the caller is not signed in.
    pub async fn load(session: &Session) -> Result<Option<Self>, tower_sessions::session::Error> {
        let logged_in: Option<bool> = session.get(LOGGED_IN_KEY).await?;
        if logged_in != Some(true) {
            return Ok(None);
        }

        let username: Option<String> = session.get(USERNAME_KEY).await?;
        Ok(Some(SessionState {
            logged_in: true,
            username: username.unwrap_or_default(),
        }))
    }

    pub async fn store(&self, session: &Session) -> Result<(), tower_sessions::session::Error> {
        session.insert(LOGGED_IN_KEY, self.logged_in).await?;
        session.insert(USERNAME_KEY, &self.username).await?;
        Ok(())
    }
}

/// Signed-in user extracted from the session.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub username: String,
}

impl SessionUser {
    /// Name shown in greetings; falls back to "there".
    pub fn display_name(&self) -> &str {
        if self.username.trim().is_empty() {
            "there"
        } else {
            &self.username
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|_| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to extract session",
                )
                    .into_response()
            })?;

        match SessionState::load(&session).await {
            Ok(Some(state)) => Ok(SessionUser {
                username: state.username,
            }),
            Ok(None) => Err(login_redirect(&parts.uri).into_response()),
            Err(e) => {
                tracing::error!(error = %e, "Failed to read session");
                Err(login_redirect(&parts.uri).into_response())
            }
        }
    }
}
