use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use secrecy::ExposeSecret;
use service_core::error::AppError;
use service_core::middleware::{
    security_headers::security_headers_middleware,
    tracing::{make_request_span, request_id_middleware},
};
use sha2::{Digest, Sha512};
use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tower_sessions::{cookie::Key, Expiry, MemoryStore, SessionManagerLayer};

use crate::config::{PortalConfig, SessionSettings};
use crate::content::ROUTES;
use crate::handlers::{
    app::health_check,
    auth::{login_handler, login_page, logout_handler},
    chat::chat,
    diagnostics::secondary_probe,
    generate::generate,
    metrics::metrics,
    pages::render_page,
};
use crate::middleware::{auth::auth_middleware, metrics::metrics_middleware};
use crate::services::providers::{gemini::GeminiProvider, openai::OpenAiProvider};
use crate::services::{ProviderDispatcher, StaticCredentialAuthenticator};
use crate::AppState;

type ServerFuture = Pin<Box<dyn Future<Output = std::io::Result<()>> + Send>>;

/// Wire providers, dispatcher and authenticator from configuration.
pub fn build_state(config: &PortalConfig) -> Result<AppState, AppError> {
    let primary = OpenAiProvider::new(config.providers.primary.clone())
        .map_err(|e| AppError::ConfigError(e.into()))?;
    let secondary = Arc::new(
        GeminiProvider::new(config.providers.secondary.clone())
            .map_err(|e| AppError::ConfigError(e.into()))?,
    );

    let dispatcher = ProviderDispatcher::new(Arc::new(primary), secondary.clone());
    let authenticator = StaticCredentialAuthenticator::new(&config.auth);

    Ok(AppState::new(
        Arc::new(dispatcher),
        Arc::new(authenticator),
        secondary,
    ))
}

pub fn build_router(state: AppState, session: &SessionSettings, static_dir: &str) -> Router {
    // Cookie signing needs a 64-byte key.
    let digest = Sha512::digest(session.secret.expose_secret().as_bytes());
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_signed(Key::from(digest.as_slice()))
        .with_secure(session.secure_cookie)
        .with_expiry(Expiry::OnInactivity(time::Duration::seconds(
            session.idle_timeout_seconds,
        )));

    let mut protected = Router::new()
        .route("/generate", post(generate))
        .route("/chat", post(chat));

    for page in ROUTES {
        protected = protected.route(page.path, get(render_page));
    }

    let protected = protected.route_layer(from_fn(auth_middleware));

    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route("/diagnostics/secondary", get(secondary_probe))
        .route("/login", get(login_page).post(login_handler))
        .route("/logout", get(logout_handler))
        .merge(protected)
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(session_layer)
        .layer(from_fn(metrics_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span::<axum::body::Body>))
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

pub struct Application {
    port: u16,
    server: ServerFuture,
}

impl Application {
    pub async fn build(config: PortalConfig) -> Result<Self, AppError> {
        let state = build_state(&config)?;
        let app = build_router(state, &config.session, &config.server.static_dir);

        let address = format!("{}:{}", config.server.host, config.server.port);
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(host = %config.server.host, port, "Listening");

        let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());

        Ok(Self {
            port,
            server: Box::pin(server.into_future()),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
