//! Validation of job payloads delivered to a webhook.
//!
//! Only the status code is compared, by value. No request is made.

use crate::error::ConvertError;
use crate::job::{Job, JobStatusCode};

#[derive(Debug, Clone, Copy, Default)]
pub struct CallbackHandler;

impl CallbackHandler {
    pub fn new() -> Self {
        Self
    }

    /// `Ok(true)` when the job completed, `JobFailed` otherwise.
    pub fn assert_completed(&self, job: &Job) -> Result<bool, ConvertError> {
        if job.status.code != JobStatusCode::Completed.as_str() {
            return Err(ConvertError::JobFailed {
                job_id: job.id.clone(),
                message: format!("the job '{}' has not been completed successfully", job.id),
            });
        }
        Ok(true)
    }

    /// Decode a raw webhook body, then check it like [`Self::assert_completed`].
    pub fn assert_completed_json(&self, raw: &str) -> Result<bool, ConvertError> {
        let job: Job = serde_json::from_str(raw)?;
        self.assert_completed(&job)
    }
}
