use std::error::Error;

use http::StatusCode;

/// Trait to be implemented by errors returned by the different operations of services.
pub trait OperationError: Error {
    /// HTTP status code corresponding to this error.
    fn status_code(&self) -> StatusCode;
}

/// Placeholder for operations that define no error of their own.
#[derive(Debug, thiserror::Error)]
pub enum Infallible {}

impl OperationError for Infallible {
    fn status_code(&self) -> StatusCode {
        match *self {}
    }
}
