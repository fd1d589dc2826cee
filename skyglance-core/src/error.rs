use reqwest::StatusCode;

/// Failures of a single weather lookup.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The provider answered with a non-success status.
    #[error("Weather API error: {status}")]
    Provider { status: StatusCode },

    /// The body was not the JSON shape we project from.
    #[error("Malformed weather response: {0}")]
    MalformedResponse(String),

    /// The request never produced a response (DNS, connect, body read).
    #[error("Weather request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The lookup task died before producing a result.
    #[error("Weather lookup task failed: {0}")]
    TaskFailed(tokio::task::JoinError),
}

impl FetchError {
    pub fn malformed(detail: impl Into<String>) -> Self {
        FetchError::MalformedResponse(detail.into())
    }

    /// HTTP status for provider errors, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            FetchError::Provider { status } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::MalformedResponse(e.to_string())
    }
}

/// Device location could not be obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    #[error("Location capability is not available")]
    Unsupported,
    #[error("Location permission denied")]
    PermissionDenied,
}
