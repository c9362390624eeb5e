mod app;
mod input;
mod render;
mod tabs;

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    sync::{Arc, Mutex},
};

use almanac_core::{
    config::{self, AppConfig},
    AcquiredTracker, BoardManager, DataWatcher, DatasetLoader, FileStore, KeyValueStore,
    LoadOptions,
};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    if let Err(err) = config::ensure_default_config() {
        warn!(?err, "could not write default configuration");
    }
    let config = AppConfig::load()?;
    info!(
        source = %config.data_source,
        storage = %config.storage_root.display(),
        "starting almanac"
    );

    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(&config.storage_root));
    let tracker = AcquiredTracker::load(Arc::clone(&store));
    let board = BoardManager::load(store);

    let source = config.source();
    let options = LoadOptions {
        trade_route_sheet: config.trade_route_sheet.clone(),
    };
    let loader = DatasetLoader::new(source.clone(), options);
    let watch_data = config.watch_data;

    let mut app = app::AlmanacApp::new(config, loader, tracker, board);

    // Dropping the watcher stops it, so it lives until the app returns.
    let _watcher = match source.directory() {
        Some(dir) if watch_data => {
            let (data_tx, data_rx) = mpsc::channel(8);
            match DataWatcher::spawn(dir.clone(), data_tx) {
                Ok(watcher) => {
                    app.attach_data_events(data_rx);
                    Some(watcher)
                }
                Err(err) => {
                    warn!(?err, dir = %dir.display(), "data directory watch unavailable");
                    None
                }
            }
        }
        _ => None,
    };

    app.run().await
}

fn init_logging() -> Result<()> {
    let log_dir = std::env::current_dir()?.join("logs");
    fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join("almanac.log");
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open log file {}", log_path.display()))?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // The terminal belongs to the UI, so only the file layer is installed.
    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .compact()
        .with_writer(Mutex::new(log_file));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    Ok(())
}
