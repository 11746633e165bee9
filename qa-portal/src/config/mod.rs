use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use service_core::config::{configuration_directory, env_value, layered_builder};
use service_core::error::AppError;

/// Development-only session secret, used when none is configured.
pub const DEV_SESSION_SECRET: &str = "qa-portal-development-session-secret";

pub const PRIMARY_CREDENTIAL_ENV: &str = "OPENAI_API_KEY";
pub const SECONDARY_CREDENTIAL_ENV: &str = "GEMINI_API_KEY";

#[derive(Deserialize, Clone, Debug)]
pub struct PortalConfig {
    pub server: ServerSettings,
    pub session: SessionSettings,
    pub auth: AuthSettings,
    pub providers: ProviderSettings,
    pub telemetry: TelemetrySettings,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Directory served under `/static`.
    pub static_dir: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct SessionSettings {
    pub secret: Secret<String>,
    /// Sessions expire after this many seconds without a request.
    pub idle_timeout_seconds: i64,
    /// Mark the cookie `Secure`; enable behind HTTPS.
    pub secure_cookie: bool,
}

#[derive(Deserialize, Clone, Debug)]
pub struct AuthSettings {
    pub username: String,
    pub password: Secret<String>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ProviderSettings {
    pub primary: OpenAiSettings,
    pub secondary: GeminiSettings,
}

#[derive(Deserialize, Clone, Debug)]
pub struct OpenAiSettings {
    #[serde(default)]
    pub api_key: Option<Secret<String>>,
    pub model: String,
    pub base_url: String,
    pub timeout_seconds: u64,
    pub temperature: f32,
}

#[derive(Deserialize, Clone, Debug)]
pub struct GeminiSettings {
    #[serde(default)]
    pub api_key: Option<Secret<String>>,
    pub model: String,
    pub base_url: String,
    pub timeout_seconds: u64,
}

#[derive(Deserialize, Clone, Debug)]
pub struct TelemetrySettings {
    pub log_level: String,
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

/// Which provider credentials are present. Read-only after startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderCredentials {
    pub primary: bool,
    pub secondary: bool,
}

impl PortalConfig {
    pub fn load() -> Result<Self, AppError> {
        let configuration_directory = configuration_directory("qa-portal")?;
        let static_dir = configuration_directory
            .parent()
            .map(|dir| dir.join("static").to_string_lossy().into_owned())
            .unwrap_or_else(|| "static".to_string());

        let settings = layered_builder(&configuration_directory)
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            .set_default("server.static_dir", static_dir)?
            .set_default("session.secret", DEV_SESSION_SECRET)?
            .set_default("session.idle_timeout_seconds", 600)?
            .set_default("session.secure_cookie", false)?
            .set_default("auth.username", "qa-tester")?
            .set_default("auth.password", "smartpass")?
            .set_default("providers.primary.model", "gpt-4o-mini")?
            .set_default("providers.primary.base_url", "https://api.openai.com/v1")?
            .set_default("providers.primary.timeout_seconds", 45)?
            .set_default("providers.primary.temperature", 0.6)?
            .set_default("providers.secondary.model", "gemini-2.0-flash")?
            .set_default(
                "providers.secondary.base_url",
                "https://generativelanguage.googleapis.com/v1beta",
            )?
            .set_default("providers.secondary.timeout_seconds", 45)?
            .set_default("telemetry.log_level", "info")?
            .set_override_option("server.port", env_value(&["PORT"]))?
            .set_override_option("session.secret", env_value(&["SESSION_SECRET"]))?
            .set_override_option(
                "providers.primary.api_key",
                env_value(&[PRIMARY_CREDENTIAL_ENV]),
            )?
            .set_override_option(
                "providers.secondary.api_key",
                env_value(&[SECONDARY_CREDENTIAL_ENV, "GOOGLE_API_KEY"]),
            )?
            .set_override_option("telemetry.otlp_endpoint", env_value(&["OTLP_ENDPOINT"]))?
            .build()?;

        Ok(settings.try_deserialize::<PortalConfig>()?)
    }

    pub fn credentials(&self) -> ProviderCredentials {
        ProviderCredentials {
            primary: has_secret(&self.providers.primary.api_key),
            secondary: has_secret(&self.providers.secondary.api_key),
        }
    }

    pub fn uses_dev_session_secret(&self) -> bool {
        self.session.secret.expose_secret() == DEV_SESSION_SECRET
    }
}

/// A credential only counts when it holds a non-blank value.
pub fn has_secret(secret: &Option<Secret<String>>) -> bool {
    secret
        .as_ref()
        .is_some_and(|s| !s.expose_secret().trim().is_empty())
}
