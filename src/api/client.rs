use reqwest::Client;
use thiserror::Error;
use tracing::debug;
use url::Url;

use super::models::{
    ApiConfig, DownloadRequest, DownloadResponse, SearchRequest, SearchResponse, StatusResponse,
};
use crate::domain::{CandidateSet, JobId, JobStatus};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Download was not started (status: {0})")]
    NotStarted(String),

    #[error("Base URL cannot be used for API requests: {0}")]
    InvalidBaseUrl(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Clone)]
pub struct ApiClient {
    config: ApiConfig,
    http: Client,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.config.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidBaseUrl(self.config.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// `POST /search`: map a source link to links on the other platforms.
    pub async fn search(&self, spotify_url: &str) -> Result<CandidateSet> {
        let url = self.endpoint(&["search"])?;
        debug!(%url, spotify_url, "searching platforms");

        let response = self
            .http
            .post(url)
            .json(&SearchRequest { spotify_url })
            .send()
            .await?
            .error_for_status()
            .map_err(|e| ApiError::ApiError(format!("Search request failed: {}", e)))?;

        let json: SearchResponse = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("JSON decode error: {}", e)))?;

        Ok(json.plataformas.into())
    }

    /// `POST /download`: ask the service to start a job for `link`.
    /// Any answer other than `started` with a job id is a failure.
    pub async fn start_download(&self, link: &str) -> Result<JobId> {
        let url = self.endpoint(&["download"])?;
        debug!(%url, link, "starting download job");

        let response = self
            .http
            .post(url)
            .json(&DownloadRequest { url: link })
            .send()
            .await?
            .error_for_status()
            .map_err(|e| ApiError::ApiError(format!("Download request failed: {}", e)))?;

        let json: DownloadResponse = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("JSON decode error: {}", e)))?;

        match (json.status.as_deref(), json.job_id) {
            (Some("started"), Some(id)) if !id.is_empty() => Ok(JobId::new(id)),
            (status, _) => Err(ApiError::NotStarted(
                status.unwrap_or("<missing>").to_string(),
            )),
        }
    }

    /// `GET /status/{job_id}`
    pub async fn job_status(&self, job_id: &JobId) -> Result<JobStatus> {
        let url = self.endpoint(&["status", job_id.as_str()])?;
        debug!(%url, "querying job status");

        let response = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| ApiError::ApiError(format!("Status request failed: {}", e)))?;

        let json: StatusResponse = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("JSON decode error: {}", e)))?;

        Ok(JobStatus::from_wire(json.status.as_deref(), json.error))
    }
}
