use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::CandidateSet;

/// Body of `POST /search`
#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest<'a> {
    pub spotify_url: &'a str,
}

/// Response from the /search endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchResponse {
    pub plataformas: PlatformLinks,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PlatformLinks {
    pub tidal: Option<String>,
    pub soundcloud: Option<String>,
    pub amazon: Option<String>,
}

impl From<PlatformLinks> for CandidateSet {
    fn from(links: PlatformLinks) -> Self {
        CandidateSet {
            tidal: links.tidal,
            soundcloud: links.soundcloud,
            amazon: links.amazon,
        }
    }
}

/// Body of `POST /download`
#[derive(Debug, Clone, Serialize)]
pub struct DownloadRequest<'a> {
    pub url: &'a str,
}

/// Response from the /download endpoint. Only `{"status": "started", "job_id": ..}`
/// counts as accepted.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DownloadResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub job_id: Option<String>,
}

/// Response from the /status/{job_id} endpoint
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Configuration for the API client
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: Url,
}

impl ApiConfig {
    pub fn new(base_url: Url) -> Self {
        Self { base_url }
    }
}

