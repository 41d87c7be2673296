use dotenvy::dotenv;
use ffmpeg_api::app;
use ffmpeg_api::config::settings::AppConfig;
use ffmpeg_api::infrastructure::storage::scratch::StorageArea;
use ffmpeg_api::state::AppState;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    info!("Starting server...");

    let config = AppConfig::new();
    match config.ffmpeg_timeout {
        Some(limit) => info!("FFmpeg timeout: {}s", limit.as_secs()),
        None => info!("FFmpeg timeout: none"),
    }

    let storage = StorageArea::init(&config.temp_dir).await?;
    let port = config.server_port;
    let app = app::create_app(AppState::new(config, storage));

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("Server running on http://0.0.0.0:{}", port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
