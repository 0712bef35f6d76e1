use std::time::Duration;

use futures::{stream::BoxStream, StreamExt};
use tracing::{info, warn};

use crate::{
    api::ApiClient,
    domain::{AppError, JobId, JobStatus, LifecyclePhase},
};

/// A start-job call the caller must run and report back with
/// [`JobTracker::start_finished`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartRequest {
    pub ticket: u64,
    pub link: String,
}

/// Result of one status check, tagged with the job it belongs to.
#[derive(Debug, Clone)]
pub struct PollOutcome {
    pub job_id: JobId,
    pub result: Result<JobStatus, AppError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollEffect {
    /// Outcome belonged to an abandoned job, or arrived after a terminal phase.
    Ignored,
    Continue,
    Stop,
}

/// Owns the single tracked download job and its lifecycle phase.
#[derive(Debug, Default)]
pub struct JobTracker {
    phase: Option<LifecyclePhase>,
    job_id: Option<JobId>,
    error: Option<AppError>,
    transient: Option<AppError>,
    ticket: u64,
}

impl JobTracker {
    /// Abandons any tracked job and enters StartingDownload.
    pub fn start(&mut self, link: &str) -> Result<StartRequest, AppError> {
        let link = link.trim();
        if link.is_empty() {
            return Err(AppError::Validation("Pick a platform link first"));
        }

        self.reset();
        self.phase = Some(LifecyclePhase::StartingDownload);
        info!(link, "starting download");

        Ok(StartRequest {
            ticket: self.ticket,
            link: link.to_string(),
        })
    }

    /// Returns the job id when the poll cycle should begin.
    pub fn start_finished(&mut self, ticket: u64, result: Result<JobId, AppError>) -> Option<JobId> {
        if ticket != self.ticket || self.phase != Some(LifecyclePhase::StartingDownload) {
            warn!(ticket, current = self.ticket, "dropping stale start response");
            return None;
        }

        match result {
            Ok(job_id) => {
                info!(%job_id, "download job accepted");
                self.job_id = Some(job_id.clone());
                self.phase = Some(LifecyclePhase::Downloading);
                Some(job_id)
            }
            Err(e) => {
                warn!(detail = e.detail(), "download job was not started");
                self.error = Some(e);
                self.phase = Some(LifecyclePhase::Failed);
                None
            }
        }
    }

    pub fn poll_finished(&mut self, outcome: PollOutcome) -> PollEffect {
        if self.phase != Some(LifecyclePhase::Downloading)
            || self.job_id.as_ref() != Some(&outcome.job_id)
        {
            warn!(job_id = %outcome.job_id, "dropping status for untracked job");
            return PollEffect::Ignored;
        }

        match outcome.result {
            Ok(JobStatus::Pending) => {
                self.transient = None;
                PollEffect::Continue
            }
            Ok(JobStatus::Done) => {
                info!(job_id = %outcome.job_id, "download completed");
                self.transient = None;
                self.phase = Some(LifecyclePhase::Completed);
                PollEffect::Stop
            }
            Ok(JobStatus::Failed(message)) => {
                let error = AppError::remote_job(message);
                warn!(job_id = %outcome.job_id, detail = error.detail(), "download failed remotely");
                self.transient = None;
                self.error = Some(error);
                self.phase = Some(LifecyclePhase::Failed);
                PollEffect::Stop
            }
            Err(e) => {
                warn!(job_id = %outcome.job_id, detail = e.detail(), "status check failed, still polling");
                self.transient = Some(e);
                PollEffect::Continue
            }
        }
    }

    /// Forgets the tracked job. The remote job is left running.
    /// Returns true when a poll cycle was active.
    pub fn reset(&mut self) -> bool {
        let was_polling = self.is_polling();
        if let Some(job_id) = &self.job_id {
            if was_polling {
                info!(%job_id, "abandoning job");
            }
        }
        self.ticket += 1;
        self.phase = None;
        self.job_id = None;
        self.error = None;
        self.transient = None;
        was_polling
    }

    /// `None` until a download is started.
    pub fn phase(&self) -> Option<LifecyclePhase> {
        self.phase
    }

    pub fn job_id(&self) -> Option<&JobId> {
        self.job_id.as_ref()
    }

    pub fn error(&self) -> Option<&AppError> {
        self.error.as_ref()
    }

    pub fn transient_error(&self) -> Option<&AppError> {
        self.transient.as_ref()
    }

    pub fn is_polling(&self) -> bool {
        self.phase == Some(LifecyclePhase::Downloading)
    }

    pub async fn start_job(client: ApiClient, request: StartRequest) -> Result<JobId, AppError> {
        client
            .start_download(&request.link)
            .await
            .map_err(|e| AppError::Start(e.to_string()))
    }
}

enum PollCycleState {
    Polling { client: ApiClient, job_id: JobId },
    Finished,
}

/// Status checks for one job: wait `interval`, query, yield, repeat.
/// Ends after yielding a terminal status. Transport failures are yielded
/// and polling carries on.
pub fn poll_cycle(
    client: ApiClient,
    job_id: JobId,
    interval: Duration,
) -> BoxStream<'static, PollOutcome> {
    futures::stream::unfold(
        PollCycleState::Polling { client, job_id },
        move |state| async move {
            match state {
                PollCycleState::Polling { client, job_id } => {
                    tokio::time::sleep(interval).await;

                    let result = client
                        .job_status(&job_id)
                        .await
                        .map_err(|e| AppError::PollTransport(e.to_string()));

                    let terminal = matches!(&result, Ok(status) if status.is_terminal());
                    let outcome = PollOutcome {
                        job_id: job_id.clone(),
                        result,
                    };

                    let next = if terminal {
                        PollCycleState::Finished
                    } else {
                        PollCycleState::Polling { client, job_id }
                    };
                    Some((outcome, next))
                }
                PollCycleState::Finished => None,
            }
        },
    )
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiConfig;

    fn downloading(tracker: &mut JobTracker, id: &str) -> JobId {
        let request = tracker.start("t1").unwrap();
        tracker
            .start_finished(request.ticket, Ok(JobId::new(id)))
            .unwrap()
    }

    fn outcome(id: &str, result: Result<JobStatus, AppError>) -> PollOutcome {
        PollOutcome {
            job_id: JobId::new(id),
            result,
        }
    }

    #[test]
    fn test_start_then_done() {
        let mut tracker = JobTracker::default();
        assert_eq!(tracker.phase(), None);

        let request = tracker.start("t1").unwrap();
        assert_eq!(tracker.phase(), Some(LifecyclePhase::StartingDownload));

        let job = tracker.start_finished(request.ticket, Ok(JobId::new("J1")));
        assert_eq!(job, Some(JobId::new("J1")));
        assert_eq!(tracker.phase(), Some(LifecyclePhase::Downloading));

        let effect = tracker.poll_finished(outcome("J1", Ok(JobStatus::Pending)));
        assert_eq!(effect, PollEffect::Continue);
        assert_eq!(tracker.phase(), Some(LifecyclePhase::Downloading));

        let effect = tracker.poll_finished(outcome("J1", Ok(JobStatus::Done)));
        assert_eq!(effect, PollEffect::Stop);
        assert_eq!(tracker.phase(), Some(LifecyclePhase::Completed));
    }

    #[test]
    fn test_start_failure_records_error() {
        let mut tracker = JobTracker::default();
        let request = tracker.start("t1").unwrap();
        let job = tracker.start_finished(request.ticket, Err(AppError::Start("failed".to_string())));

        assert_eq!(job, None);
        assert_eq!(tracker.phase(), Some(LifecyclePhase::Failed));
        assert_eq!(tracker.error().unwrap().to_string(), "could not start download");
    }

    #[test]
    fn test_empty_link_is_rejected() {
        let mut tracker = JobTracker::default();
        downloading(&mut tracker, "J1");
        assert!(matches!(tracker.start(""), Err(AppError::Validation(_))));
        assert_eq!(tracker.phase(), Some(LifecyclePhase::Downloading));
    }

    #[test]
    fn test_remote_failure_is_terminal() {
        let mut tracker = JobTracker::default();
        downloading(&mut tracker, "J1");

        let effect = tracker.poll_finished(outcome(
            "J1",
            Ok(JobStatus::Failed(Some("track not found".to_string()))),
        ));
        assert_eq!(effect, PollEffect::Stop);
        assert_eq!(tracker.phase(), Some(LifecyclePhase::Failed));
        assert_eq!(tracker.error().unwrap().to_string(), "track not found");

        // Nothing after a terminal phase moves it.
        let effect = tracker.poll_finished(outcome("J1", Ok(JobStatus::Done)));
        assert_eq!(effect, PollEffect::Ignored);
        assert_eq!(tracker.phase(), Some(LifecyclePhase::Failed));
    }

    #[test]
    fn test_remote_failure_without_message() {
        let mut tracker = JobTracker::default();
        downloading(&mut tracker, "J1");
        tracker.poll_finished(outcome("J1", Ok(JobStatus::Failed(None))));
        assert_eq!(
            tracker.error().unwrap().to_string(),
            "download failed on the server"
        );
    }

    #[test]
    fn test_transport_error_is_not_sticky() {
        let mut tracker = JobTracker::default();
        downloading(&mut tracker, "J1");

        let effect = tracker.poll_finished(outcome(
            "J1",
            Err(AppError::PollTransport("connection refused".to_string())),
        ));
        assert_eq!(effect, PollEffect::Continue);
        assert_eq!(tracker.phase(), Some(LifecyclePhase::Downloading));
        assert_eq!(
            tracker.transient_error().unwrap().to_string(),
            "error querying status"
        );

        tracker.poll_finished(outcome("J1", Ok(JobStatus::Done)));
        assert_eq!(tracker.phase(), Some(LifecyclePhase::Completed));
        assert_eq!(tracker.transient_error(), None);
    }

    #[test]
    fn test_stale_job_results_are_ignored() {
        let mut tracker = JobTracker::default();
        downloading(&mut tracker, "J1");
        downloading(&mut tracker, "J2");

        let effect = tracker.poll_finished(outcome("J1", Ok(JobStatus::Done)));
        assert_eq!(effect, PollEffect::Ignored);
        assert_eq!(tracker.phase(), Some(LifecyclePhase::Downloading));
        assert_eq!(tracker.job_id(), Some(&JobId::new("J2")));
    }

    #[test]
    fn test_stale_start_response_is_ignored() {
        let mut tracker = JobTracker::default();
        let first = tracker.start("t1").unwrap();
        let second = tracker.start("a1").unwrap();

        assert_eq!(tracker.start_finished(first.ticket, Ok(JobId::new("J1"))), None);
        assert_eq!(tracker.phase(), Some(LifecyclePhase::StartingDownload));

        assert_eq!(
            tracker.start_finished(second.ticket, Ok(JobId::new("J2"))),
            Some(JobId::new("J2"))
        );
        assert_eq!(tracker.job_id(), Some(&JobId::new("J2")));
    }

    #[test]
    fn test_reset_reports_active_cycle() {
        let mut tracker = JobTracker::default();
        downloading(&mut tracker, "J1");
        assert!(tracker.reset());
        assert_eq!(tracker.phase(), None);
        assert!(!tracker.reset());
    }

    #[tokio::test]
    async fn test_poll_cycle_stops_after_terminal_status() {
        let mut server = mockito::Server::new_async().await;
        let pending = server
            .mock("GET", "/status/J1")
            .with_status(200)
            .with_body(r#"{"status":"PENDING"}"#)
            .expect(1)
            .create_async()
            .await;
        let done = server
            .mock("GET", "/status/J1")
            .with_status(200)
            .with_body(r#"{"status":"DONE"}"#)
            .expect(1)
            .create_async()
            .await;

        let client = ApiClient::new(ApiConfig::new(server.url().parse().unwrap()));
        let outcomes: Vec<PollOutcome> = poll_cycle(client, JobId::new("J1"), Duration::from_millis(5))
            .collect()
            .await;

        let statuses: Vec<_> = outcomes.into_iter().map(|o| o.result.unwrap()).collect();
        assert_eq!(statuses, vec![JobStatus::Pending, JobStatus::Done]);

        tokio::time::sleep(Duration::from_millis(30)).await;
        pending.assert_async().await;
        done.assert_async().await;
    }

    #[tokio::test]
    async fn test_poll_cycle_keeps_going_after_transport_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/status/J1")
            .with_status(503)
            .expect(1)
            .create_async()
            .await;
        server
            .mock("GET", "/status/J1")
            .with_status(200)
            .with_body(r#"{"status":"DONE"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(ApiConfig::new(server.url().parse().unwrap()));
        let outcomes: Vec<PollOutcome> = poll_cycle(client, JobId::new("J1"), Duration::from_millis(5))
            .collect()
            .await;

        assert_eq!(outcomes.len(), 2);
        assert!(matches!(outcomes[0].result, Err(AppError::PollTransport(_))));
        assert_eq!(outcomes[1].result, Ok(JobStatus::Done));
    }
}
