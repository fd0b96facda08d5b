// EstateHub notification stream server
// Decision: Postgres when DATABASE_URL is set, in-memory storage otherwise (dev mode)
// Decision: Shutdown closes every open stream before the listener drains

use std::sync::Arc;

use anyhow::{Context, Result};
use estatehub_api::{
    api::{health::HealthState, notifications::AppState},
    auth::{AuthConfig, JwtSessionResolver},
    build_app,
    config::ServerConfig,
    telemetry::{init_telemetry, TelemetryConfig},
};
use estatehub_core::{NotificationStreamService, StreamConfig};
use estatehub_storage::StorageBackend;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present (local development)
    let _ = dotenvy::dotenv();

    let config = ServerConfig::from_env()?;
    init_telemetry(TelemetryConfig::from_env(config.log_format));

    tracing::info!("estatehub-api starting...");

    // Initialize storage
    let backend = match &config.database_url {
        Some(url) => {
            let backend = StorageBackend::postgres(url, config.max_connections)
                .await
                .context("Failed to connect to database")?;
            tracing::info!(max_connections = config.max_connections, "Connected to database");
            backend
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory storage (dev mode)");
            StorageBackend::in_memory()
        }
    };

    if config.run_migrations {
        backend
            .run_migrations()
            .await
            .context("Failed to run migrations")?;
        tracing::info!("Database migrations applied");
    }

    // Stream service
    let stream_config = StreamConfig::from_env();
    tracing::info!(
        poll_interval_secs = stream_config.poll_interval.as_secs(),
        notification_limit = stream_config.notification_limit,
        offer_window_secs = stream_config.offer_window.as_secs(),
        "Notification stream configured"
    );
    let storage = backend.kind();
    let streams = Arc::new(NotificationStreamService::new(
        Arc::new(backend),
        stream_config,
    ));

    // Session resolution
    let auth_config = AuthConfig::from_env();
    tracing::info!(cookie = %auth_config.cookie_name, "Session resolution configured");
    let sessions = Arc::new(JwtSessionResolver::new(&auth_config));

    if !config.api_prefix.is_empty() {
        tracing::info!(prefix = %config.api_prefix, "API prefix configured");
    }

    let state = AppState::new(streams.clone(), sessions, config.keep_alive);
    let health_state = HealthState {
        storage,
        streams: streams.clone(),
    };

    let app = build_app(state, health_state, &config.api_prefix).layer(TraceLayer::new_for_http());

    // Start HTTP server
    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .context("Failed to bind to address")?;
    tracing::info!("HTTP server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            tracing::info!("Received shutdown signal");
            streams.shutdown();
        })
        .await
        .context("Server error")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = terminate.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
