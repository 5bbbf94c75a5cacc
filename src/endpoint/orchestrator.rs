use std::path::Path;

use super::jobs::JobsEndpoint;
use crate::client::resources::UPLOAD_FILE;
use crate::client::{Transport, generate_url};
use crate::error::ConvertError;
use crate::job::{Input, Job, JobSpec, JobStatusCode, partition_inputs};

impl<T: Transport> JobsEndpoint<T> {
    /// Create a job and drive it to completion.
    ///
    /// Remote-like inputs go into the creation request. Upload inputs are
    /// pushed afterwards: the job is created with `process: false`, awaited
    /// until `ready`, fed its files, awaited again and then patched to start
    /// processing. Outside async mode the call then waits for `completed`.
    /// The returned snapshot is always a fresh fetch of the job.
    ///
    /// Nothing is rolled back on failure; the service expires partial jobs.
    pub async fn post_full_job(&self, job: JobSpec) -> Result<Job, ConvertError> {
        if job.is_empty() {
            return Err(ConvertError::InvalidArgument("the job is empty".into()));
        }
        if job.input.is_empty() {
            return Err(ConvertError::InvalidArgument(
                "post_full_job needs at least one input, use post_incomplete_job instead".into(),
            ));
        }
        self.check_callback_for_async(job.callback.as_deref())?;

        let mut job = job;
        let (uploads, remote) = partition_inputs(std::mem::take(&mut job.input));
        let remote_count = remote.len();
        job.input = remote;
        if !uploads.is_empty() {
            job.process = Some(false);
        }

        let created = self.post_job(&job).await?;
        tracing::info!(
            job_id = %created.id,
            remote_inputs = remote_count,
            upload_inputs = uploads.len(),
            "job created"
        );

        let token = created
            .token
            .clone()
            .or_else(|| self.core.user_token().map(str::to_string));
        let token = token.as_deref();

        if !uploads.is_empty() {
            let mut first_wait = vec![JobStatusCode::Ready];
            if remote_count == 0 {
                first_wait.push(JobStatusCode::Incomplete);
            }
            let ready = self
                .wait_with_token(&created.id, &first_wait, self.wait_defaults.clone(), token)
                .await?;

            let server = ready
                .server
                .as_deref()
                .or(created.server.as_deref())
                .ok_or_else(|| {
                    let message = format!("job {} has no upload server", created.id);
                    ConvertError::InvalidArgument(message)
                })?;

            for input in &uploads {
                if let Input::Upload { source } = input {
                    self.upload_source(source, &created.id, server, token).await?;
                }
            }

            self.wait_with_token(
                &created.id,
                &[JobStatusCode::Ready],
                self.wait_defaults.clone(),
                token,
            )
            .await?;

            self.start_processing(&created.id, token).await?;
            tracing::info!(job_id = %created.id, "uploads done, processing started");
        }

        if !self.async_mode {
            self.wait_with_token(
                &created.id,
                &[JobStatusCode::Completed],
                self.wait_defaults.clone(),
                token,
            )
            .await?;
            tracing::info!(job_id = %created.id, "job completed");
        }

        self.get_job_with_token(&created.id, token).await
    }

    /// Start a job created with `process: false`.
    ///
    /// Waits until the job can accept the trigger, patches it, then waits for
    /// completion (sync mode) or returns the current snapshot (async mode).
    pub async fn process_job(&self, job_id: &str) -> Result<Job, ConvertError> {
        if job_id.trim().is_empty() {
            return Err(ConvertError::InvalidArgument("job id is empty".into()));
        }
        let token = self.core.user_token();

        self.wait_with_token(
            job_id,
            &[
                JobStatusCode::Ready,
                JobStatusCode::Incomplete,
                JobStatusCode::Downloading,
            ],
            self.wait_defaults.clone(),
            token,
        )
        .await?;

        self.start_processing(job_id, token).await?;

        if !self.async_mode {
            return self
                .wait_with_token(
                    job_id,
                    &[JobStatusCode::Completed],
                    self.wait_defaults.clone(),
                    token,
                )
                .await;
        }

        self.get_job_with_token(job_id, token).await
    }

    async fn upload_source(
        &self,
        source: &Path,
        job_id: &str,
        server: &str,
        token: Option<&str>,
    ) -> Result<(), ConvertError> {
        let url = generate_url(UPLOAD_FILE, &[("server", server), ("job_id", job_id)], &[]);
        tracing::debug!(job_id, source = %source.display(), "uploading input");
        self.core.executor().upload_file(source, &url, token).await?;
        Ok(())
    }
}
