use std::time::Duration;

use futures::{
    future::{AbortHandle, BoxFuture},
    stream::{self, BoxStream},
    FutureExt, StreamExt,
};
use tracing::info;

use crate::{
    api::ApiClient,
    application::{
        discovery::DiscoveryController,
        job_tracker::{poll_cycle, JobTracker, PollEffect, PollOutcome},
    },
    domain::{AppError, CandidateSet, JobId, LifecyclePhase},
};

/// Completions of the work started by coordinator intents.
#[derive(Debug, Clone)]
pub enum CoordinatorEvent {
    PlatformsFound {
        ticket: u64,
        result: Result<CandidateSet, AppError>,
    },
    DownloadStarted {
        ticket: u64,
        result: Result<JobId, AppError>,
    },
    StatusPolled(PollOutcome),
}

/// State holder observed by the presentation layer.
///
/// Intents return the future to run; its output goes back through
/// [`DownloadCoordinator::apply`]. When a job is accepted, `apply` hands out
/// the poll cycle stream. The coordinator keeps the abort handle of that
/// stream so at most one cycle is ever alive.
pub struct DownloadCoordinator {
    api_client: ApiClient,
    poll_interval: Duration,
    discovery: DiscoveryController,
    tracker: JobTracker,
    poll_handle: Option<AbortHandle>,
    /// Rejected intent, shown until the phase it was raised in changes.
    notice: Option<(LifecyclePhase, AppError)>,
}

impl DownloadCoordinator {
    pub fn new(api_client: ApiClient, poll_interval: Duration) -> Self {
        Self {
            api_client,
            poll_interval,
            discovery: DiscoveryController::default(),
            tracker: JobTracker::default(),
            poll_handle: None,
            notice: None,
        }
    }

    /// Searches alternate platforms for `link`. Also resets the job tracker.
    pub fn discover(&mut self, link: &str) -> Result<BoxFuture<'static, CoordinatorEvent>, AppError> {
        let request = match self.discovery.begin(link) {
            Ok(request) => request,
            Err(e) => {
                self.reject(e.clone());
                return Err(e);
            }
        };
        self.notice = None;
        self.reset();
        info!(link = %request.link, "searching platforms");

        let client = self.api_client.clone();
        let ticket = request.ticket;
        Ok(async move {
            let result = DiscoveryController::search(client, request).await;
            CoordinatorEvent::PlatformsFound { ticket, result }
        }
        .boxed())
    }

    /// Starts a remote job for `link`, abandoning any job being tracked.
    pub fn start_download(&mut self, link: &str) -> Result<BoxFuture<'static, CoordinatorEvent>, AppError> {
        // Validate first: a rejected link keeps the current job and its cycle
        let request = match self.tracker.start(link) {
            Ok(request) => request,
            Err(e) => {
                self.reject(e.clone());
                return Err(e);
            }
        };
        self.stop_polling();
        self.notice = None;

        let client = self.api_client.clone();
        let ticket = request.ticket;
        Ok(async move {
            let result = JobTracker::start_job(client, request).await;
            CoordinatorEvent::DownloadStarted { ticket, result }
        }
        .boxed())
    }

    /// Stops observing the current job. The remote job is not cancelled.
    pub fn reset(&mut self) {
        self.stop_polling();
        self.tracker.reset();
    }

    /// Applies a completion. Returns the poll cycle to drive when a job was
    /// just accepted.
    pub fn apply(&mut self, event: CoordinatorEvent) -> Option<BoxStream<'static, CoordinatorEvent>> {
        match event {
            CoordinatorEvent::PlatformsFound { ticket, result } => {
                self.discovery.finish(ticket, result);
                None
            }
            CoordinatorEvent::DownloadStarted { ticket, result } => {
                let job_id = self.tracker.start_finished(ticket, result)?;
                Some(self.begin_polling(job_id))
            }
            CoordinatorEvent::StatusPolled(outcome) => {
                if self.tracker.poll_finished(outcome) == PollEffect::Stop {
                    self.stop_polling();
                }
                None
            }
        }
    }

    fn reject(&mut self, error: AppError) {
        self.notice = Some((self.phase(), error));
    }

    fn begin_polling(&mut self, job_id: JobId) -> BoxStream<'static, CoordinatorEvent> {
        self.stop_polling();
        let (cycle, handle) = stream::abortable(poll_cycle(
            self.api_client.clone(),
            job_id,
            self.poll_interval,
        ));
        self.poll_handle = Some(handle);
        cycle.map(CoordinatorEvent::StatusPolled).boxed()
    }

    fn stop_polling(&mut self) {
        if let Some(handle) = self.poll_handle.take() {
            handle.abort();
        }
    }

    pub fn phase(&self) -> LifecyclePhase {
        self.tracker.phase().unwrap_or_else(|| self.discovery.phase())
    }

    pub fn candidates(&self) -> Option<&CandidateSet> {
        self.discovery.candidates()
    }

    /// Error behind the current Failed phase.
    pub fn error(&self) -> Option<&AppError> {
        if self.phase() != LifecyclePhase::Failed {
            return None;
        }
        self.tracker.error().or_else(|| self.discovery.error())
    }

    pub fn active_job(&self) -> Option<&JobId> {
        self.tracker.job_id()
    }

    /// New searches and downloads are accepted unless a search or a start
    /// request is still pending. A running download may be abandoned.
    pub fn accepts_intents(&self) -> bool {
        !matches!(
            self.phase(),
            LifecyclePhase::SearchingPlatforms | LifecyclePhase::StartingDownload
        )
    }

    pub fn is_polling(&self) -> bool {
        self.poll_handle.is_some()
    }

    pub fn status_message(&self) -> String {
        if let Some((raised_in, notice)) = &self.notice {
            if *raised_in == self.phase() {
                return notice.to_string();
            }
        }

        match self.phase() {
            LifecyclePhase::Idle => "Paste a Spotify link".to_string(),
            LifecyclePhase::SearchingPlatforms => "Searching platforms...".to_string(),
            LifecyclePhase::PlatformsReady => match self.candidates() {
                Some(set) if !set.is_empty() => "Pick a platform".to_string(),
                _ => "No alternate platforms found".to_string(),
            },
            LifecyclePhase::StartingDownload => "Starting download...".to_string(),
            LifecyclePhase::Downloading => match self.tracker.transient_error() {
                Some(e) => e.to_string(),
                None => "Downloading, keep the app open...".to_string(),
            },
            LifecyclePhase::Completed => "Download completed".to_string(),
            LifecyclePhase::Failed => self
                .error()
                .map(ToString::to_string)
                .unwrap_or_else(|| "Something went wrong".to_string()),
        }
    }
}
