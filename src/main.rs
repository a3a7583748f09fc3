use std::sync::Arc;

use clap::Parser;
use color_eyre::Result;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::ApiClient;
use crate::app::App;
use crate::config::KeyResolver;
use crate::session::{CredentialStore, FileCredentialStore};

mod api;
mod app;
mod cli;
mod commands;
mod config;
mod model;
mod screen;
mod search;
mod session;
mod theme;
mod tui;
mod ui;
mod viewmodel;

pub use theme::Theme;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let _guard = initialize_logging()?;
    info!("Starting stockdesk");

    let args = cli::Args::parse();

    let config = config::load()?;
    let resolver = Arc::new(KeyResolver::new(Arc::new(config.keybindings)));
    let theme = theme::theme_from_name(&config.theme.name);

    let base_url = args.api_url.unwrap_or(config.api.base_url);
    let store = FileCredentialStore::open_default();
    info!(path = %store.path().display(), "Using credential store");
    let credentials: Arc<dyn CredentialStore> = Arc::new(store);
    let api = ApiClient::new(&base_url, Arc::clone(&credentials))?;
    let api_url = api.base_url().to_string();
    info!(%api_url, "Using product API");

    let mut app = App::new(
        Arc::new(api),
        credentials,
        resolver,
        theme,
        &api_url,
        args.email.unwrap_or_default(),
    );
    app.run().await
}

fn initialize_logging() -> Result<WorkerGuard> {
    let directory = dirs::data_local_dir().map_or_else(
        || std::path::PathBuf::from("logs"),
        |path| path.join("stockdesk").join("logs"),
    );
    std::fs::create_dir_all(&directory)?;

    let file_appender = tracing_appender::rolling::daily(&directory, "stockdesk.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true),
        )
        .init();

    Ok(guard)
}
