pub mod discovery;
pub mod download_coordinator;
pub mod job_tracker;

pub use download_coordinator::{CoordinatorEvent, DownloadCoordinator};
