use anyhow::Result;
use chrono::Utc;
use lichub_server::app;
use lichub_server::config::ServerConfig;
use lichub_server::state::AppState;
use lichub_storage::attachments::AttachmentStore;
use lichub_storage::store::EntityStore;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("lichub_server=info".parse()?)
                .add_directive("lichub_storage=info".parse()?),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let config_path = args
        .get(1)
        .map(|s| s.as_str())
        .unwrap_or("config/server.toml");

    let config = if std::path::Path::new(config_path).exists() {
        ServerConfig::load(config_path)?
    } else {
        tracing::warn!(path = %config_path, "config file not found, using defaults");
        ServerConfig::default()
    };

    tracing::info!(
        http_port = config.http_port,
        db = %config.database.url,
        uploads = %config.uploads.dir,
        "lichub-server starting"
    );

    std::fs::create_dir_all(&config.database.data_dir)?;
    std::fs::create_dir_all(&config.uploads.dir)?;

    let store = Arc::new(EntityStore::new(&config.database.url).await?);
    let attachments = Arc::new(AttachmentStore::new(&config.uploads.dir));

    let state = AppState {
        store,
        attachments,
        start_time: Utc::now(),
        config: Arc::new(config.clone()),
    };

    let http_addr: SocketAddr = format!("0.0.0.0:{}", config.http_port).parse()?;
    let app = app::build_http_app(state);
    let listener = tokio::net::TcpListener::bind(http_addr).await?;

    tracing::info!(http = %http_addr, "Server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            signal::ctrl_c().await.ok();
        })
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
