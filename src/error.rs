use crate::api::ApiError;
use thiserror::Error;

/// Failure of a user-triggered operation.
///
/// Everything is recovered at the handler that triggered it; see
/// [`crate::notify::Toaster::report`] for which variants reach the user.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub(crate) enum TodoError {
    #[error("Not authenticated")]
    Unauthenticated,

    /// Empty or over-length field. Never shown.
    #[error("Validation failed")]
    ValidationFailed,

    /// Another operation of the same controller is still running.
    #[error("Operation already in progress")]
    InFlight,

    #[error("{0}")]
    Backend(String),
}

impl TodoError {
    pub fn is_silent(&self) -> bool {
        matches!(self, TodoError::ValidationFailed | TodoError::InFlight)
    }
}

impl From<ApiError> for TodoError {
    fn from(e: ApiError) -> Self {
        TodoError::Backend(e.message)
    }
}

pub(crate) type TodoResult<T> = Result<T, TodoError>;
