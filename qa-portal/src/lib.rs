pub mod config;
pub mod content;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod startup;

use services::providers::gemini::GeminiProvider;
use services::{Authenticator, OfflineResponder, ProviderDispatcher};
use std::sync::Arc;

/// Shared application state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<ProviderDispatcher>,
    pub authenticator: Arc<dyn Authenticator>,
    pub offline: OfflineResponder,
    /// Kept separately from the dispatcher for the connectivity probe.
    pub secondary: Arc<GeminiProvider>,
}

impl AppState {
    pub fn new(
        dispatcher: Arc<ProviderDispatcher>,
        authenticator: Arc<dyn Authenticator>,
        secondary: Arc<GeminiProvider>,
    ) -> Self {
        Self {
            dispatcher,
            authenticator,
            offline: OfflineResponder,
            secondary,
        }
    }
}
