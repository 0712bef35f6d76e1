use thiserror::Error;

/// Failures surfaced to the presentation layer.
///
/// `Display` is the short status text shown to the user. The `String`
/// payloads carry the underlying cause for logging only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(&'static str),

    #[error("discovery failed")]
    Discovery(String),

    #[error("could not start download")]
    Start(String),

    #[error("error querying status")]
    PollTransport(String),

    #[error("{0}")]
    RemoteJob(String),
}

impl AppError {
    pub fn remote_job(message: Option<String>) -> Self {
        match message {
            Some(m) if !m.trim().is_empty() => AppError::RemoteJob(m),
            _ => AppError::RemoteJob("download failed on the server".to_string()),
        }
    }

    /// Cause recorded in logs; never shown to the user.
    pub fn detail(&self) -> &str {
        match self {
            AppError::Validation(msg) => *msg,
            AppError::Discovery(d)
            | AppError::Start(d)
            | AppError::PollTransport(d)
            | AppError::RemoteJob(d) => d.as_str(),
        }
    }
}
