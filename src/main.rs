//! mailgate - entry point for the gateway server.

use std::sync::Arc;

use anyhow::Context;

use mailgate::config::GatewaySettings;
use mailgate::providers::email::{ImapConnector, SmtpMailer};
use mailgate::server::{self, ServerState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Refuse to start without the shared secret.
    let settings = match GatewaySettings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("configuration error: {e}");
            std::process::exit(1);
        }
    };

    let state = Arc::new(ServerState {
        api_key: settings.api_key.clone(),
        connector: Arc::new(ImapConnector),
        transport: Arc::new(SmtpMailer),
    });

    let app = server::router(state);
    let addr = format!("{}:{}", settings.bind, settings.port);

    tracing::info!("mailgate listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
