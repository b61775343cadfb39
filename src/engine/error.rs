//! Pipeline error types

use crate::workflow::{InputError, ValidationResult};

/// Failure of a single remote stage
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StageError {
    /// The service answered with a non-2xx status
    #[error("{stage} rejected (HTTP {status}): {body}")]
    RemoteRejected {
        stage: String,
        status: u16,
        body: String,
    },

    /// No response was obtained
    #[error("{stage} unreachable: {message}")]
    TransportFailure { stage: String, message: String },

    /// A 2xx body did not match the stage's expected format
    #[error("{stage} returned an unreadable response: {message}")]
    DecodeFailure { stage: String, message: String },
}

impl StageError {
    pub fn stage(&self) -> &str {
        match self {
            StageError::RemoteRejected { stage, .. }
            | StageError::TransportFailure { stage, .. }
            | StageError::DecodeFailure { stage, .. } => stage,
        }
    }

    /// Text shown on the error surface. Rejections show the service's body
    /// verbatim.
    pub fn diagnostic(&self) -> String {
        match self {
            StageError::RemoteRejected { body, .. } => body.clone(),
            StageError::TransportFailure { message, .. }
            | StageError::DecodeFailure { message, .. } => message.clone(),
        }
    }

    /// Decode failures are reported as transport failures
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            StageError::TransportFailure { .. } | StageError::DecodeFailure { .. }
        )
    }
}

/// Failure of a local platform capability (file save, browser launch)
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No URL opener available: {0}")]
    NoOpener(String),

    #[error("{0}")]
    Other(String),
}

/// Errors surfaced by a workflow trigger
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A run of this workflow is already in flight; the trigger had no effect
    #[error("A run is already in progress")]
    Busy,

    #[error("{0}")]
    Validation(ValidationResult),

    #[error(transparent)]
    Stage(#[from] StageError),

    #[error("Failed to save artifact: {0}")]
    Persistence(PlatformError),

    #[error("Failed to open link: {0}")]
    Navigation(PlatformError),

    #[error("No trace is available for the last run")]
    NoTrace,

    #[error("Input error: {0}")]
    Input(#[from] InputError),

    #[error("Pipeline has no stages")]
    EmptyPipeline,
}

impl PipelineError {
    /// Text for the single aggregate error surface
    pub fn diagnostic(&self) -> String {
        match self {
            PipelineError::Stage(stage) => stage.diagnostic(),
            other => other.to_string(),
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, PipelineError::Busy)
    }

    pub fn validation(&self) -> Option<&ValidationResult> {
        match self {
            PipelineError::Validation(result) => Some(result),
            _ => None,
        }
    }

    pub fn stage_error(&self) -> Option<&StageError> {
        match self {
            PipelineError::Stage(stage) => Some(stage),
            _ => None,
        }
    }
}
