mod bootstrap;
mod chat;
mod health;
mod routes;
mod weather;

use std::time::Duration;

use agrichat_core::config::{AppConfig, LoadOptions};
use anyhow::Result;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

fn init_logging(config: &AppConfig) {
    use agrichat_core::config::LogFormat::*;

    let filter = EnvFilter::try_from_env("AGRICHAT_LOG_FILTER")
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.trim().to_ascii_lowercase()));
    let builder = tracing_subscriber::fmt().with_target(false).with_env_filter(filter);

    match config.logging.format {
        Compact => builder.compact().init(),
        Pretty => builder.pretty().init(),
        Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config)?;
    let server = &app.config.server;
    let address = format!("{}:{}", server.bind_address, server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    let router = routes::router(app.state.clone(), server.static_dir.as_deref());

    tracing::info!(
        event_name = "system.server.started",
        correlation_id = "bootstrap",
        bind_address = %address,
        static_dir = ?server.static_dir,
        "agrichat-server listening"
    );

    let grace = Duration::from_secs(server.graceful_shutdown_secs);
    let (stop_tx, mut stop_rx) = watch::channel(false);
    let serving = axum::serve(listener, router).with_graceful_shutdown(async move {
        wait_for_shutdown().await;
        let _ = stop_tx.send(true);
    });
    let mut server_task = tokio::spawn(async move { serving.await });

    tokio::select! {
        result = &mut server_task => result??,
        _ = stop_rx.changed() => match tokio::time::timeout(grace, &mut server_task).await {
            Ok(result) => result??,
            Err(_) => {
                tracing::warn!(
                    event_name = "system.server.shutdown_timeout",
                    correlation_id = "shutdown",
                    grace_secs = grace.as_secs(),
                    "in-flight requests did not finish before the shutdown deadline"
                );
                server_task.abort();
            }
        },
    }

    tracing::info!(
        event_name = "system.server.stopped",
        correlation_id = "shutdown",
        "agrichat-server stopped"
    );
    Ok(())
}

async fn wait_for_shutdown() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(
            event_name = "system.server.signal_error",
            correlation_id = "shutdown",
            error = %error,
            "could not listen for ctrl-c"
        );
        std::future::pending::<()>().await;
    }
    tracing::info!(
        event_name = "system.server.stopping",
        correlation_id = "shutdown",
        "shutdown signal received, draining connections"
    );
}
