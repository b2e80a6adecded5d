//! HTTP listener: bind, serve, drain on signal.

use anyhow::Result;
use axum::Router;
use tubely_core::constants::BYTES_PER_MB;
use tubely_core::Config;

/// Bind `0.0.0.0:{SERVER_PORT}` and serve `app` until a shutdown signal
/// arrives. In-flight uploads are allowed to finish before this returns.
pub async fn start_server(config: &Config, app: Router) -> Result<()> {
    let addr = format!("0.0.0.0:{}", config.server_port());
    tracing::info!(addr = %addr, "Binding listener");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(
        max_thumbnail_mb = config.max_thumbnail_size_bytes() / BYTES_PER_MB,
        max_video_mb = config.max_video_size_bytes() / BYTES_PER_MB,
        storage_backend = %config.storage_backend(),
        ffmpeg_path = %config.ffmpeg_path(),
        ffprobe_path = %config.ffprobe_path(),
        staging_dir = %config.staging_dir().display(),
        "Tubely listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Completes on the first SIGINT, or SIGTERM on Unix.
///
/// # Panics
/// If tokio cannot register either signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal");
        },
    }

    tracing::info!("Draining connections");
}
