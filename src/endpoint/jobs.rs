use std::sync::Arc;

use serde_json::{Value, json};
use url::Url;

use super::wait::WaitOptions;
use super::{EndpointCore, to_body};
use crate::client::resources::{JOB_ID, JOB_ID_HISTORY, JOB_ID_THREADS, JOBS};
use crate::client::{Method, RequestExecutor, Transport, generate_url};
use crate::error::ConvertError;
use crate::job::{Job, JobSpec, JobStatusCode};

/// The `jobs` resource: creation, lookup, patching and deletion, plus the
/// wait protocol and full-job orchestration built on top of them.
#[derive(Debug)]
pub struct JobsEndpoint<T> {
    pub(super) core: EndpointCore<T>,
    pub(super) async_mode: bool,
    pub(super) wait_defaults: WaitOptions,
}

impl<T> Clone for JobsEndpoint<T> {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
            async_mode: self.async_mode,
            wait_defaults: self.wait_defaults.clone(),
        }
    }
}

impl<T: Transport> JobsEndpoint<T> {
    pub fn new(executor: Arc<RequestExecutor<T>>) -> Self {
        Self {
            core: EndpointCore::new(executor),
            async_mode: false,
            wait_defaults: WaitOptions::default(),
        }
    }

    /// In async mode jobs must carry a callback URL and orchestration does
    /// not wait for completion.
    pub fn with_async(mut self, async_mode: bool) -> Self {
        self.async_mode = async_mode;
        self
    }

    /// Token sent as `X-OC-TOKEN` on job-scoped requests.
    pub fn with_user_token(mut self, token: impl Into<String>) -> Self {
        self.core.set_user_token(Some(token.into()));
        self
    }

    /// Interval and timeout used by the waits inside orchestration.
    pub fn with_wait_defaults(mut self, options: WaitOptions) -> Self {
        self.wait_defaults = options;
        self
    }

    pub fn is_async(&self) -> bool {
        self.async_mode
    }

    pub fn user_token(&self) -> Option<&str> {
        self.core.user_token()
    }

    /// Create a job exactly as given.
    pub async fn post_job(&self, job: &JobSpec) -> Result<Job, ConvertError> {
        let body = to_body(job)?;
        self.core.call(Method::Post, JOBS, Some(&body), None).await
    }

    /// Create a job that will not start processing until it is patched.
    pub async fn post_incomplete_job(&self, job: &JobSpec) -> Result<Job, ConvertError> {
        self.check_callback_for_async(job.callback.as_deref())?;

        let mut job = job.clone();
        job.process = Some(false);
        self.post_job(&job).await
    }

    pub async fn get_job(&self, job_id: &str) -> Result<Job, ConvertError> {
        self.get_job_with_token(job_id, self.core.user_token()).await
    }

    pub async fn get_jobs(&self) -> Result<Vec<Job>, ConvertError> {
        self.core
            .call(Method::Get, JOBS, None, self.core.user_token())
            .await
    }

    pub async fn get_jobs_by_status(
        &self,
        status: JobStatusCode,
    ) -> Result<Vec<Job>, ConvertError> {
        let url = generate_url(JOBS, &[], &[("status", status.as_str())]);
        self.core
            .call(Method::Get, &url, None, self.core.user_token())
            .await
    }

    pub async fn patch_job(&self, job_id: &str, patch: &Value) -> Result<Job, ConvertError> {
        self.patch_job_with_token(job_id, patch, self.core.user_token())
            .await
    }

    /// Delete a job that has not started.
    pub async fn delete_job(&self, job_id: &str) -> Result<(), ConvertError> {
        let url = generate_url(JOB_ID, &[("job_id", job_id)], &[]);
        self.core
            .send_raw(Method::Delete, &url, None, self.core.user_token())
            .await?;
        Ok(())
    }

    pub async fn get_job_threads(&self, job_id: &str) -> Result<Value, ConvertError> {
        let url = generate_url(JOB_ID_THREADS, &[("job_id", job_id)], &[]);
        self.core
            .call(Method::Get, &url, None, self.core.user_token())
            .await
    }

    pub async fn get_job_history(&self, job_id: &str) -> Result<Value, ConvertError> {
        let url = generate_url(JOB_ID_HISTORY, &[("job_id", job_id)], &[]);
        self.core
            .call(Method::Get, &url, None, self.core.user_token())
            .await
    }

    pub(super) async fn get_job_with_token(
        &self,
        job_id: &str,
        token: Option<&str>,
    ) -> Result<Job, ConvertError> {
        let url = generate_url(JOB_ID, &[("job_id", job_id)], &[]);
        self.core.call(Method::Get, &url, None, token).await
    }

    pub(super) async fn patch_job_with_token(
        &self,
        job_id: &str,
        patch: &Value,
        token: Option<&str>,
    ) -> Result<Job, ConvertError> {
        let url = generate_url(JOB_ID, &[("job_id", job_id)], &[]);
        self.core.call(Method::Patch, &url, Some(patch), token).await
    }

    /// Trigger processing. The reply body is ignored; a `204` is enough.
    pub(super) async fn start_processing(
        &self,
        job_id: &str,
        token: Option<&str>,
    ) -> Result<(), ConvertError> {
        let url = generate_url(JOB_ID, &[("job_id", job_id)], &[]);
        self.core
            .send_raw(Method::Patch, &url, Some(&json!({ "process": true })), token)
            .await?;
        Ok(())
    }

    /// Async jobs need an absolute callback URL.
    pub(super) fn check_callback_for_async(
        &self,
        callback: Option<&str>,
    ) -> Result<(), ConvertError> {
        if !self.async_mode {
            return Ok(());
        }
        match callback.map(Url::parse) {
            Some(Ok(url)) if url.has_host() => Ok(()),
            _ => Err(ConvertError::CallbackNotDefined),
        }
    }
}
