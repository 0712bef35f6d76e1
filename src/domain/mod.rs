pub mod error;
pub mod model;

pub use error::AppError;
pub use model::{CandidateSet, JobId, JobStatus, LifecyclePhase, Platform};
