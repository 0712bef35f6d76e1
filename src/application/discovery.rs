use tracing::{info, warn};

use crate::{
    api::ApiClient,
    domain::{AppError, CandidateSet, LifecyclePhase},
};

/// A search the caller must run and report back with [`DiscoveryController::finish`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryRequest {
    pub ticket: u64,
    pub link: String,
}

/// Holds the candidate set for the latest source link.
#[derive(Debug)]
pub struct DiscoveryController {
    phase: LifecyclePhase,
    candidates: Option<CandidateSet>,
    error: Option<AppError>,
    ticket: u64,
}

impl Default for DiscoveryController {
    fn default() -> Self {
        Self {
            phase: LifecyclePhase::Idle,
            candidates: None,
            error: None,
            ticket: 0,
        }
    }
}

pub fn validate_link(link: &str) -> Result<&str, AppError> {
    let link = link.trim();
    if link.is_empty() {
        return Err(AppError::Validation("Paste a Spotify link"));
    }
    if link.chars().any(char::is_whitespace) {
        return Err(AppError::Validation("The link must not contain spaces"));
    }
    Ok(link)
}

impl DiscoveryController {
    /// Validates `link` and clears the held candidates. Nothing changes when
    /// validation fails.
    pub fn begin(&mut self, link: &str) -> Result<DiscoveryRequest, AppError> {
        let link = validate_link(link)?;

        self.ticket += 1;
        self.candidates = None;
        self.error = None;
        self.phase = LifecyclePhase::SearchingPlatforms;

        Ok(DiscoveryRequest {
            ticket: self.ticket,
            link: link.to_string(),
        })
    }

    /// Applies a search result. Returns false when a newer search superseded it.
    pub fn finish(&mut self, ticket: u64, result: Result<CandidateSet, AppError>) -> bool {
        if ticket != self.ticket || self.phase != LifecyclePhase::SearchingPlatforms {
            warn!(ticket, current = self.ticket, "dropping stale search result");
            return false;
        }

        match result {
            Ok(candidates) => {
                info!(found = candidates.available().len(), "platforms ready");
                self.candidates = Some(candidates);
                self.phase = LifecyclePhase::PlatformsReady;
            }
            Err(e) => {
                warn!(detail = e.detail(), "platform search failed");
                self.error = Some(e);
                self.phase = LifecyclePhase::Failed;
            }
        }
        true
    }

    pub fn phase(&self) -> LifecyclePhase {
        self.phase
    }

    pub fn candidates(&self) -> Option<&CandidateSet> {
        self.candidates.as_ref()
    }

    pub fn error(&self) -> Option<&AppError> {
        self.error.as_ref()
    }

    pub async fn search(client: ApiClient, request: DiscoveryRequest) -> Result<CandidateSet, AppError> {
        client
            .search(&request.link)
            .await
            .map_err(|e| AppError::Discovery(e.to_string()))
    }
}
