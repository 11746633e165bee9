use qa_portal::config::{PortalConfig, PRIMARY_CREDENTIAL_ENV, SECONDARY_CREDENTIAL_ENV};
use qa_portal::startup::Application;
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let configuration = PortalConfig::load().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing(
        "qa-portal",
        &configuration.telemetry.log_level,
        configuration.telemetry.otlp_endpoint.as_deref(),
    )?;

    let credentials = configuration.credentials();
    if !credentials.primary {
        tracing::warn!(
            credential = PRIMARY_CREDENTIAL_ENV,
            "Primary model disabled; requests for it will be answered locally"
        );
    }
    if !credentials.secondary {
        tracing::warn!(
            credential = SECONDARY_CREDENTIAL_ENV,
            "Secondary model disabled; requests for it will be answered locally"
        );
    }
    if configuration.uses_dev_session_secret() {
        tracing::warn!("SESSION_SECRET not set, using the development session secret");
    }

    let application = Application::build(configuration).await?;
    tracing::info!(port = application.port(), "Starting qa-portal");

    application.run_until_stopped().await.map_err(|e| {
        tracing::error!("Server error: {}", e);
        anyhow::anyhow!("Server error: {}", e)
    })?;

    Ok(())
}
