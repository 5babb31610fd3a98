use thiserror::Error;

/// Failures raised by the ring itself. Everything else is a silent no-op.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RingError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// Stable machine-readable code carried in error responses.
    pub fn code(&self) -> &'static str {
        match self {
            ServerError::Validation(_) => "VALIDATION_ERROR",
            ServerError::InvalidArgument(_) => "INVALID_ARGUMENT",
            ServerError::Internal(_) => "INTERNAL",
        }
    }

    /// HTTP status code for this error.
    pub fn status(&self) -> u16 {
        match self {
            ServerError::Validation(_) | ServerError::InvalidArgument(_) => 400,
            ServerError::Internal(_) => 500,
        }
    }
}

impl From<RingError> for ServerError {
    fn from(err: RingError) -> Self {
        match err {
            RingError::InvalidArgument(msg) => ServerError::InvalidArgument(msg),
        }
    }
}
