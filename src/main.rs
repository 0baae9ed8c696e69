use clap::Parser;
use themis::adapters::health_handler::HealthHandler;
use themis::adapters::http_handler::MockServerState;
use themis::adapters::router::OperationCatalog;
use themis::cli::Cli;
use themis::config::{watcher::ConfigWatcher, Settings};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt::init();

    // CLI > env vars > config file
    let settings = Settings::new_with_cli(&cli)?;
    let host = settings.server.host.clone();
    let port = settings.server.port;

    if settings.operations.is_empty() {
        warn!("No operations loaded, every request will be answered with 404");
    }
    info!(
        "Starting Themis mock server on {}:{} with {} operation(s)",
        host,
        port,
        settings.operations.len()
    );

    let root = cli
        .config
        .parent()
        .and_then(|p| p.to_str())
        .filter(|p| !p.is_empty())
        .unwrap_or(".")
        .to_string();
    let watched_paths = settings.watched_paths(&root);
    let mock_settings = settings.mock.clone();

    let catalog = Arc::new(RwLock::new(OperationCatalog::new(settings.operations)));

    let _watcher = if cli.watch {
        let catalog_for_watcher = catalog.clone();
        let cli_for_watcher = cli.clone();
        Some(ConfigWatcher::new(watched_paths, move || {
            match Settings::new_with_cli(&cli_for_watcher) {
                Ok(new_settings) => {
                    let count = new_settings.operations.len();
                    let mut w = catalog_for_watcher.blocking_write();
                    *w = OperationCatalog::new(new_settings.operations);
                    info!("Operations reloaded successfully ({} operation(s))", count);
                }
                Err(e) => error!("Failed to reload operations, keeping the previous set: {}", e),
            }
        })?)
    } else {
        None
    };

    let health_handler = Arc::new(HealthHandler::new(catalog.clone()));
    let state = MockServerState::new(catalog, mock_settings);
    let app = themis::create_app(state, health_handler);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
