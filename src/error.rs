use serde::Serialize;
use thiserror::Error;

/// Message shown when the service fails without a usable `detail`.
pub const GENERIC_FAILURE: &str = "Analysis failed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    ValidationPrecondition,
    TransportFailure,
    ServiceFailure,
    MalformedResponse,
    RenderPrecondition,
}

/// Why a dashboard could not be built from an analysis result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("Analysis returned no recommendations")]
    EmptyRecommendations,
    #[error("Recommendation {position} has rank {found}, expected {expected}")]
    RankOrder {
        position: usize,
        expected: u32,
        found: u32,
    },
}

/// Failure of a submission cycle. `Display` is the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Transport(String),
    #[error("{message}")]
    Service { status: u16, message: String },
    #[error("{0}")]
    MalformedResponse(String),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("A submission is already in progress")]
    Busy,
}

impl SubmitError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SubmitError::Validation(_) => ErrorKind::ValidationPrecondition,
            SubmitError::Transport(_) => ErrorKind::TransportFailure,
            SubmitError::Service { .. } => ErrorKind::ServiceFailure,
            SubmitError::MalformedResponse(_) => ErrorKind::MalformedResponse,
            SubmitError::Render(_) => ErrorKind::RenderPrecondition,
            SubmitError::Busy => ErrorKind::ValidationPrecondition,
        }
    }
}

impl From<reqwest::Error> for SubmitError {
    fn from(err: reqwest::Error) -> Self {
        SubmitError::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_error_displays_message_only() {
        let err = SubmitError::Service {
            status: 500,
            message: "file too large".into(),
        };
        assert_eq!(err.to_string(), "file too large");
        assert_eq!(err.kind(), ErrorKind::ServiceFailure);
    }

    #[test]
    fn render_error_maps_to_render_precondition() {
        let err = SubmitError::from(RenderError::EmptyRecommendations);
        assert_eq!(err.kind(), ErrorKind::RenderPrecondition);
        assert_eq!(err.to_string(), "Analysis returned no recommendations");
    }
}
