use std::time::Duration;

use clap::Parser;
use url::Url;

use crate::api::ApiConfig;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

/// Runtime settings, from flags or the environment.
#[derive(Debug, Clone, Parser)]
#[command(name = "music-link-downloader", version, about = "Find a track on other platforms and download it")]
pub struct AppConfig {
    /// Base URL of the search/download service
    #[arg(long = "api-url", env = "MUSIC_API_URL", default_value = DEFAULT_API_URL)]
    pub api_base_url: Url,

    /// Delay between job status checks, in milliseconds
    #[arg(
        long = "poll-interval-ms",
        env = "MUSIC_POLL_INTERVAL_MS",
        default_value_t = 2000,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub poll_interval_ms: u64,
}

impl AppConfig {
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig::new(self.api_base_url.clone())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
