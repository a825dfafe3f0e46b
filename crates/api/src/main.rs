use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storymaker_api::config::ServerConfig;
use storymaker_api::router::build_app_router;
use storymaker_api::state::AppState;
use storymaker_api::ws;
use storymaker_events::EventJournal;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storymaker_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env().expect("Invalid server configuration");
    tracing::info!(
        host = %config.host,
        port = %config.port,
        generation_enabled = config.stability.is_some(),
        generation_timeout_secs = config.generation_timeout_secs,
        "Loaded server configuration"
    );
    if config.stability.is_none() {
        tracing::warn!("STABILITY_API_KEY is not set, shots will be saved without generated images");
    }

    // --- App state ---
    let state =
        AppState::from_config(config.clone()).expect("Failed to build image provider client");
    let ws_manager = Arc::clone(&state.ws_manager);

    // --- Background services ---
    let heartbeat_cancel = CancellationToken::new();
    let heartbeat_handle = ws::start_heartbeat(Arc::clone(&ws_manager), heartbeat_cancel.clone());

    let journal_handle = tokio::spawn(EventJournal::run(state.event_bus.subscribe()));
    let broadcaster_handle = tokio::spawn(
        ws::StateBroadcaster::new(Arc::clone(&ws_manager)).run(state.event_bus.subscribe()),
    );
    tracing::info!("Event services started (journal, state broadcaster)");

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    heartbeat_cancel.cancel();
    let _ = heartbeat_handle.await;

    // Closing the sockets releases the last gateway handles, which closes
    // the event bus and ends the journal and broadcaster.
    let ws_count = ws_manager.connection_count().await;
    tracing::info!(ws_count, "Closing remaining WebSocket connections");
    ws_manager.shutdown_all().await;

    let drain = Duration::from_secs(config.shutdown_timeout_secs);
    match tokio::time::timeout(drain, journal_handle).await {
        Ok(Ok(recorded)) => tracing::info!(recorded, "Event journal stopped"),
        _ => tracing::warn!("Event journal did not stop in time"),
    }
    if tokio::time::timeout(drain, broadcaster_handle).await.is_err() {
        tracing::warn!("State broadcaster did not stop in time");
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
