//! sendwire server binary.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use sendwire::{AppState, ServerConfig, create_router};
use sendwire_core::{Dispatcher, JsonSettingsFile, JsonlDeliveryLog, Mailer};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "sendwire=debug,sendwire_core=debug,sendwire_smtp=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;
    info!(?config, "Loaded configuration");

    if let Some(dir) = config.delivery_log_path.parent() {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Cannot create {}", dir.display()))?;
    }

    let dispatcher = Dispatcher::new(
        JsonSettingsFile::new(&config.settings_path),
        JsonlDeliveryLog::new(&config.delivery_log_path),
        Mailer::new(),
    );
    let app = create_router(Arc::new(AppState::new(dispatcher)));

    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Cannot listen on {}", config.bind))?;
    info!("Listening on http://{}", config.bind);

    axum::serve(listener, app).await?;

    Ok(())
}
