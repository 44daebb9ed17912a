//! Error types for backend-facing operations.

use cutline_core::CutlineError;
use thiserror::Error;

/// Errors from talking to the project backend.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The backend rejected or failed a request.
    #[error("{operation} failed: {message}")]
    Request {
        operation: &'static str,
        message: String,
    },

    /// A response arrived for a project that is no longer active.
    #[error("Discarded stale response for project {project_id}")]
    Stale { project_id: String },

    /// Operation needs an open project.
    #[error("No project is open")]
    NoProject,

    #[error(transparent)]
    Core(#[from] CutlineError),
}

impl ServiceError {
    pub fn request(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Request {
            operation,
            message: message.into(),
        }
    }
}

/// Result type alias for service operations.
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
