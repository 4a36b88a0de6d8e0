use std::error::Error;
use std::fmt::Display;

use http::StatusCode;
use strum::AsRefStr;

use crate::operation_error::OperationError;

/// Envelope for everything an endpoint can fail with: input validation,
/// operation-specific errors and internal faults that must never leak details.
#[derive(Debug, AsRefStr)]
pub enum EndpointError<E: OperationError> {
    Validation(String),
    Internal,
    Operation(E),
}

impl<E: OperationError> EndpointError<E> {
    pub fn validation(msg: impl Into<String>) -> Self {
        EndpointError::Validation(msg.into())
    }

    pub fn internal() -> Self {
        EndpointError::Internal
    }

    pub fn operation(err: E) -> Self {
        EndpointError::Operation(err)
    }

    /// The client-facing message, without the variant prefix.
    pub fn message(&self) -> String {
        match self {
            EndpointError::Validation(msg) => msg.clone(),
            EndpointError::Internal => String::from("Internal server error."),
            EndpointError::Operation(err) => err.to_string(),
        }
    }
}

impl<E: OperationError> OperationError for EndpointError<E> {
    fn status_code(&self) -> StatusCode {
        match self {
            EndpointError::Validation(_) => StatusCode::BAD_REQUEST,
            EndpointError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            EndpointError::Operation(e) => e.status_code(),
        }
    }
}

impl<E: OperationError> Error for EndpointError<E> {}

impl<E: OperationError> Display for EndpointError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.as_ref(), self.message())
    }
}
