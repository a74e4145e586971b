//! Error taxonomy for remote operations.
//!
//! Every remote-call failure is caught at the operation boundary and turned
//! into one of these variants; nothing here is fatal to the process. Partial
//! batch failures are not an error — they are carried by
//! [`BatchSummary`](crate::models::BatchSummary).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not complete at all (DNS, connect, timeout,
    /// interrupted body).
    #[error("network error: {0}")]
    Network(String),

    /// The backend answered with a non-2xx status. `message` is the body's
    /// `error` field when parseable, otherwise the status text.
    #[error("server error {status}: {message}")]
    Server { status: u16, message: String },

    /// Input rejected before any network call was issued.
    #[error("{0}")]
    Validation(String),

    /// An upload or reindex already holds the operation guard. The request
    /// is dropped, not queued.
    #[error("another operation is in progress")]
    OperationInProgress,
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Network(err.to_string())
    }
}
