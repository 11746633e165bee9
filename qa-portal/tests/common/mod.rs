//! Shared setup for qa-portal integration tests.
//!
//! Builds the real router against wiremock servers standing in for both model
//! providers and drives it in-process with `oneshot`.

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, Response, StatusCode},
    Router,
};
use qa_portal::config::{
    AuthSettings, GeminiSettings, OpenAiSettings, PortalConfig, ProviderSettings, ServerSettings,
    SessionSettings, TelemetrySettings,
};
use qa_portal::startup::{build_router, build_state};
use secrecy::Secret;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tower::util::ServiceExt;
use wiremock::MockServer;

pub const USERNAME: &str = "qa-tester";
pub const PASSWORD: &str = "smartpass";
pub const PRIMARY_KEY: &str = "sk-test-primary";
pub const SECONDARY_KEY: &str = "test-secondary-key";
pub const SECONDARY_MODEL: &str = "gemini-2.0-flash";

pub struct TestApp {
    pub router: Router,
    pub primary: MockServer,
    pub secondary: MockServer,
    /// `name=value` of the signed session cookie once logged in.
    pub cookie: Option<String>,
}

#[derive(Clone, Copy)]
pub struct Keys {
    pub primary: bool,
    pub secondary: bool,
}

impl Keys {
    pub const BOTH: Keys = Keys {
        primary: true,
        secondary: true,
    };
    pub const NONE: Keys = Keys {
        primary: false,
        secondary: false,
    };
}

pub fn test_config(primary_url: &str, secondary_url: &str, keys: Keys) -> PortalConfig {
    PortalConfig {
        server: ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
            static_dir: concat!(env!("CARGO_MANIFEST_DIR"), "/static").to_string(),
        },
        session: SessionSettings {
            secret: Secret::new("integration-test-session-secret".to_string()),
            idle_timeout_seconds: 600,
            secure_cookie: false,
        },
        auth: AuthSettings {
            username: USERNAME.to_string(),
            password: Secret::new(PASSWORD.to_string()),
        },
        providers: ProviderSettings {
            primary: OpenAiSettings {
                api_key: keys.primary.then(|| Secret::new(PRIMARY_KEY.to_string())),
                model: "gpt-4o-mini".to_string(),
                base_url: primary_url.to_string(),
                timeout_seconds: 5,
                temperature: 0.6,
            },
            secondary: GeminiSettings {
                api_key: keys.secondary.then(|| Secret::new(SECONDARY_KEY.to_string())),
                model: SECONDARY_MODEL.to_string(),
                base_url: secondary_url.to_string(),
                timeout_seconds: 5,
            },
        },
        telemetry: TelemetrySettings {
            log_level: "error".to_string(),
            otlp_endpoint: None,
        },
    }
}

impl TestApp {
    pub async fn spawn(keys: Keys) -> Self {
        Self::spawn_with(keys, |_| {}).await
    }

    /// Spawn with a hook to adjust configuration before the router is built.
    pub async fn spawn_with(keys: Keys, adjust: impl FnOnce(&mut PortalConfig)) -> Self {
        let primary = MockServer::start().await;
        let secondary = MockServer::start().await;

        let mut config = test_config(&primary.uri(), &secondary.uri(), keys);
        adjust(&mut config);

        let state = build_state(&config).expect("Failed to build application state");
        let router = build_router(state, &config.session, &config.server.static_dir);

        Self {
            router,
            primary,
            secondary,
            cookie: None,
        }
    }

    pub async fn send(&self, mut request: Request<Body>) -> Response<Body> {
        if let Some(cookie) = &self.cookie {
            request
                .headers_mut()
                .insert(header::COOKIE, cookie.parse().unwrap());
        }
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post_json(&self, uri: &str, body: serde_json::Value) -> Response<Body> {
        self.post_raw(uri, "application/json", body.to_string()).await
    }

    pub async fn post_raw(&self, uri: &str, content_type: &str, body: String) -> Response<Body> {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, content_type)
                .body(Body::from(body))
                .unwrap(),
        )
        .await
    }

    pub async fn post_login(&self, uri: &str, username: &str, password: &str) -> Response<Body> {
        let form = serde_urlencoded::to_string([("username", username), ("password", password)])
            .unwrap();
        self.post_raw(uri, "application/x-www-form-urlencoded", form)
            .await
    }

    /// Sign in with the demo account and keep the session cookie.
    pub async fn login(&mut self) {
        let response = self.post_login("/login", USERNAME, PASSWORD).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        self.cookie = Some(session_cookie(&response).expect("login did not set a session cookie"));
    }
}

/// `name=value` part of the first `Set-Cookie` header.
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|pair| pair.trim().to_string())
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn secondary_generate_path() -> String {
    format!("/models/{}:generateContent", SECONDARY_MODEL)
}

/// What a [`truncated_body_server`] does after sending a partial body.
#[derive(Clone, Copy)]
pub enum AfterPartialBody {
    /// Keep the connection open without sending the rest.
    Stall,
    /// Drop the connection.
    Close,
}

/// Raw HTTP server that answers every request with the given status, a
/// `content-length` of 100 and only the first few bytes of the body. Returns
/// its base URL.
pub async fn truncated_body_server(status: u16, after: AfterPartialBody) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                read_request(&mut socket).await;

                let head = format!(
                    "HTTP/1.1 {} Partial\r\ncontent-type: application/json\r\ncontent-length: 100\r\n\r\n{{\"candidates\": [",
                    status
                );
                let _ = socket.write_all(head.as_bytes()).await;
                let _ = socket.flush().await;

                if let AfterPartialBody::Stall = after {
                    tokio::time::sleep(Duration::from_secs(10)).await;
                }
            });
        }
    });

    format!("http://{}", addr)
}

/// Consume one request (headers plus `content-length` bytes of body).
async fn read_request(socket: &mut tokio::net::TcpStream) {
    let mut received = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let Ok(n) = socket.read(&mut chunk).await else { return };
        if n == 0 {
            return;
        }
        received.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&received);
        let Some(header_end) = text.find("\r\n\r\n") else { continue };
        let content_length = text[..header_end]
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);

        if received.len() >= header_end + 4 + content_length {
            return;
        }
    }
}
