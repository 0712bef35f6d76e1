mod api;
mod app;
mod application;
mod config;
mod domain;
mod ui;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("music_link_downloader=info")),
        )
        .init();

    let config = AppConfig::parse();
    info!(
        api = %config.api_base_url,
        poll_interval_ms = config.poll_interval_ms,
        "starting music link downloader"
    );

    iced::application(move || app::DownloadApp::new(&config), app::update, app::view)
        .title("Music Link Downloader")
        .run()
}
