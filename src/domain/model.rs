use std::fmt;

/// Platforms the search service can map a source link to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Tidal,
    SoundCloud,
    Amazon,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Tidal, Platform::SoundCloud, Platform::Amazon];

    pub fn label(self) -> &'static str {
        match self {
            Platform::Tidal => "Tidal",
            Platform::SoundCloud => "SoundCloud",
            Platform::Amazon => "Amazon Music",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Alternate links found for one source link.
///
/// A missing entry means the platform is not offered. An all-absent set is
/// a valid result and means no alternates were found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateSet {
    pub tidal: Option<String>,
    pub soundcloud: Option<String>,
    pub amazon: Option<String>,
}

impl CandidateSet {
    pub fn get(&self, platform: Platform) -> Option<&str> {
        let link = match platform {
            Platform::Tidal => &self.tidal,
            Platform::SoundCloud => &self.soundcloud,
            Platform::Amazon => &self.amazon,
        };
        link.as_deref().filter(|l| !l.trim().is_empty())
    }

    /// Present links in display order.
    pub fn available(&self) -> Vec<(Platform, &str)> {
        Platform::ALL
            .into_iter()
            .filter_map(|p| self.get(p).map(|link| (p, link)))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.available().is_empty()
    }
}

/// Opaque job token issued by the download service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Remote job status as reported by `GET /status/{id}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Done,
    Failed(Option<String>),
}

impl JobStatus {
    /// Anything other than `DONE` or `ERROR` means keep polling.
    pub fn from_wire(status: Option<&str>, error: Option<String>) -> Self {
        match status {
            Some("DONE") => JobStatus::Done,
            Some("ERROR") => JobStatus::Failed(error),
            _ => JobStatus::Pending,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Pending)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    Idle,
    SearchingPlatforms,
    PlatformsReady,
    StartingDownload,
    Downloading,
    Completed,
    Failed,
}

impl LifecyclePhase {
    /// Completed or Failed: nothing moves until a new intent.
    pub fn is_terminal(self) -> bool {
        matches!(self, LifecyclePhase::Completed | LifecyclePhase::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_available_skips_missing_and_blank_links() {
        let set = CandidateSet {
            tidal: Some("t1".to_string()),
            soundcloud: Some("  ".to_string()),
            amazon: Some("a1".to_string()),
        };
        assert_eq!(
            set.available(),
            vec![(Platform::Tidal, "t1"), (Platform::Amazon, "a1")]
        );
        assert_eq!(set.get(Platform::SoundCloud), None);
        assert!(!set.is_empty());
        assert!(CandidateSet::default().is_empty());
    }

    #[test]
    fn test_job_status_from_wire() {
        assert_eq!(JobStatus::from_wire(Some("DONE"), None), JobStatus::Done);
        assert_eq!(
            JobStatus::from_wire(Some("ERROR"), Some("disk full".to_string())),
            JobStatus::Failed(Some("disk full".to_string()))
        );
        assert_eq!(JobStatus::from_wire(Some("PENDING"), None), JobStatus::Pending);
        assert_eq!(JobStatus::from_wire(Some("RUNNING"), None), JobStatus::Pending);
        assert_eq!(JobStatus::from_wire(None, None), JobStatus::Pending);
    }

    #[test]
    fn test_terminal_phases() {
        assert!(LifecyclePhase::Completed.is_terminal());
        assert!(LifecyclePhase::Failed.is_terminal());
        assert!(!LifecyclePhase::Downloading.is_terminal());
        assert!(!LifecyclePhase::PlatformsReady.is_terminal());
    }
}
