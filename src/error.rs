//! Error type shared by every layer of the SDK.
//!
//! [`ConvertError`] covers request execution, status decoding, the wait
//! protocol and job orchestration. Everything propagates to the direct caller;
//! the only local recovery is the status-based retry in
//! [`client::retry`](crate::client::retry).

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::job::JobStatusCode;

#[derive(Debug, Error)]
pub enum ConvertError {
    /// HTTP verb outside `GET`, `POST`, `PATCH`, `DELETE`.
    #[error("{0} is not allowed")]
    MethodNotAllowed(String),

    /// The service answered with a status outside the accepted success set.
    #[error("Status code: {status}, was not valid. Reason: {body}")]
    RequestFailed { status: u16, body: String },

    /// A status code outside the fixed table was decoded.
    #[error("Unknown status: {0}")]
    UnknownStatus(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Engine {0} does not exist")]
    InvalidEngine(String),

    #[error("Async jobs must have a valid callback url to notify when the job finish")]
    CallbackNotDefined,

    /// The awaited status can no longer be reached from the current one.
    #[error("The awaited status {awaited} can never be reached since the actual status is {actual}")]
    InvalidStatus {
        awaited: JobStatusCode,
        actual: JobStatusCode,
    },

    #[error("Job {job_id} failed: {message}")]
    JobFailed { job_id: String, message: String },

    #[error("Timeout reached after {waited:?} while waiting for the status of job {job_id}")]
    Timeout { job_id: String, waited: Duration },

    #[error("Wait for job {0} was cancelled")]
    Cancelled(String),

    #[error("{} does not exist", .0.display())]
    FileNotFound(PathBuf),

    #[error("'{0}' has no api key defined")]
    NoApiKeyDefined(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConvertError {
    /// HTTP status carried by the error, when there is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ConvertError::RequestFailed { status, .. } => Some(*status),
            ConvertError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type Result<T, E = ConvertError> = std::result::Result<T, E>;
