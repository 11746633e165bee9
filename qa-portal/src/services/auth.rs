//! Sign-in for the portal.
//!
//! Route logic depends only on the [`Authenticator`] trait so a real identity
//! provider can replace the single demo account.

use secrecy::{ExposeSecret, Secret};
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::config::AuthSettings;
use crate::models::SessionState;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid Credentials. Please try again.")]
    InvalidCredentials,
}

/// Submitted login form values.
pub struct Credentials {
    pub username: String,
    pub password: Secret<String>,
}

pub trait Authenticator: Send + Sync {
    fn authenticate(&self, credentials: &Credentials) -> Result<SessionState, AuthError>;
}

/// Accepts exactly one configured username/password pair.
pub struct StaticCredentialAuthenticator {
    username: String,
    password: Secret<String>,
}

impl StaticCredentialAuthenticator {
    pub fn new(settings: &AuthSettings) -> Self {
        Self {
            username: settings.username.clone(),
            password: settings.password.clone(),
        }
    }
}

impl Authenticator for StaticCredentialAuthenticator {
    fn authenticate(&self, credentials: &Credentials) -> Result<SessionState, AuthError> {
        let user_ok = credentials
            .username
            .as_bytes()
            .ct_eq(self.username.as_bytes());
        let pass_ok = credentials
            .password
            .expose_secret()
            .as_bytes()
            .ct_eq(self.password.expose_secret().as_bytes());

        if bool::from(user_ok & pass_ok) {
            Ok(SessionState {
                logged_in: true,
                username: credentials.username.clone(),
            })
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }
}
