//! Polling a job until it reaches one of a set of statuses.
//!
//! Each iteration fetches the job and decides, in order: target reached,
//! target unreachable, job failed, or sleep and poll again. Reachability is
//! judged against the highest-ranked awaited status only, so waiting for
//! `{ready, completed}` keeps polling through `processing` even though
//! `ready` is already behind.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::jobs::JobsEndpoint;
use crate::client::resources::JOB_ID;
use crate::client::{Method, Transport, generate_url};
use crate::endpoint::decode;
use crate::error::ConvertError;
use crate::job::{Job, JobStatus, JobStatusCode};

/// Default pause between two polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Upper bound for any wait (4 hours).
pub const MAX_WAITING_TIME: Duration = Duration::from_secs(14_400);

#[derive(Debug, Clone)]
pub struct WaitOptions {
    pub poll_interval: Duration,
    pub timeout: Duration,
    /// Aborts the wait at the next sleep when triggered.
    pub cancel: Option<CancellationToken>,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: MAX_WAITING_TIME,
            cancel: None,
        }
    }
}

impl WaitOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Interval of at least one second, timeout of at most four hours.
    pub fn clamped(mut self) -> Self {
        if self.poll_interval < DEFAULT_POLL_INTERVAL {
            self.poll_interval = DEFAULT_POLL_INTERVAL;
        }
        if self.timeout > MAX_WAITING_TIME {
            self.timeout = MAX_WAITING_TIME;
        }
        self
    }
}

/// Highest-ranked status among `targets`, never below `incomplete`.
/// On equal rank the later target wins.
pub fn highest_target(targets: &[JobStatusCode]) -> JobStatus {
    targets
        .iter()
        .map(|code| JobStatus::from(*code))
        .fold(JobStatus::from(JobStatusCode::Incomplete), |highest, candidate| {
            if highest.can_be_updated(&candidate) {
                candidate
            } else {
                highest
            }
        })
}

impl<T: Transport> JobsEndpoint<T> {
    /// Poll `job_id` until its status is one of `targets`.
    ///
    /// Fails with [`ConvertError::InvalidStatus`] once the job has moved past
    /// every awaited status, [`ConvertError::JobFailed`] when the job fails
    /// first, [`ConvertError::Timeout`] when `options.timeout` elapses and
    /// [`ConvertError::Cancelled`] when the cancel token fires.
    pub async fn wait_for_status(
        &self,
        job_id: &str,
        targets: &[JobStatusCode],
        options: WaitOptions,
    ) -> Result<Job, ConvertError> {
        self.wait_with_token(job_id, targets, options, self.core.user_token())
            .await
    }

    pub(super) async fn wait_with_token(
        &self,
        job_id: &str,
        targets: &[JobStatusCode],
        options: WaitOptions,
        token: Option<&str>,
    ) -> Result<Job, ConvertError> {
        if job_id.trim().is_empty() {
            return Err(ConvertError::InvalidArgument("job id is empty".into()));
        }
        if targets.is_empty() {
            return Err(ConvertError::InvalidArgument(
                "no statuses provided to wait for".into(),
            ));
        }

        let options = options.clamped();
        let highest = highest_target(targets);
        let url = generate_url(JOB_ID, &[("job_id", job_id)], &[]);
        let mut elapsed = Duration::ZERO;

        tracing::debug!(job_id, ?targets, highest = %highest, "waiting for job status");

        loop {
            let raw = self.core.send_raw(Method::Get, &url, None, token).await?;
            let job: Job = decode(&raw)?;
            let current = job.status()?;

            tracing::debug!(
                job_id,
                status = %current,
                elapsed_secs = elapsed.as_secs(),
                "polled job"
            );

            if targets.contains(&current.code()) {
                return Ok(job);
            }

            if !current.can_be_updated(&highest) {
                return Err(ConvertError::InvalidStatus {
                    awaited: highest.code(),
                    actual: current.code(),
                });
            }

            if current.is_status(JobStatusCode::Failed) {
                return Err(ConvertError::JobFailed {
                    job_id: job_id.to_string(),
                    message: raw,
                });
            }

            match &options.cancel {
                Some(cancel) => {
                    tokio::select! {
                        _ = cancel.cancelled() => {
                            tracing::info!(job_id, "wait cancelled");
                            return Err(ConvertError::Cancelled(job_id.to_string()));
                        }
                        _ = tokio::time::sleep(options.poll_interval) => {}
                    }
                }
                None => tokio::time::sleep(options.poll_interval).await,
            }

            elapsed += options.poll_interval;
            if elapsed > options.timeout {
                break;
            }
        }

        tracing::warn!(job_id, waited_secs = elapsed.as_secs(), "timed out waiting for job status");
        Err(ConvertError::Timeout {
            job_id: job_id.to_string(),
            waited: elapsed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::MockTransport;
    use crate::endpoint::test_support::{BASE, executor};

    fn status_body(code: &str) -> String {
        format!(r#"{{"id":"J1","status":{{"code":"{code}","info":""}}}}"#)
    }

    fn endpoint(transport: MockTransport) -> JobsEndpoint<MockTransport> {
        JobsEndpoint::new(executor(transport)).with_user_token("tok")
    }

    #[test]
    fn highest_target_picks_max_rank() {
        use JobStatusCode::*;
        assert_eq!(highest_target(&[Ready, Incomplete]).code(), Ready);
        assert_eq!(highest_target(&[Completed, Ready]).code(), Completed);
        assert_eq!(highest_target(&[Ready, Downloading]).code(), Downloading);
        assert_eq!(highest_target(&[Downloading, Ready]).code(), Ready);
        assert_eq!(highest_target(&[]).code(), Incomplete);
    }

    #[test]
    fn options_are_clamped() {
        let opts = WaitOptions::new()
            .with_poll_interval(Duration::from_millis(10))
            .with_timeout(Duration::from_secs(100_000))
            .clamped();
        assert_eq!(opts.poll_interval, Duration::from_secs(1));
        assert_eq!(opts.timeout, MAX_WAITING_TIME);

        let opts = WaitOptions::new()
            .with_poll_interval(Duration::from_secs(5))
            .with_timeout(Duration::from_secs(60))
            .clamped();
        assert_eq!(opts.poll_interval, Duration::from_secs(5));
        assert_eq!(opts.timeout, Duration::from_secs(60));
    }

    #[tokio::test]
    async fn rejects_empty_arguments() {
        let jobs = endpoint(MockTransport::new());
        let err = jobs
            .wait_for_status("", &[JobStatusCode::Ready], WaitOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ConvertError::InvalidArgument(_)));

        let err = jobs
            .wait_for_status("J1", &[], WaitOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ConvertError::InvalidArgument(_)));
        assert!(jobs.core.executor().transport().requests().is_empty());
    }

    #[tokio::test]
    async fn returns_immediately_on_match() {
        let jobs = endpoint(MockTransport::new().fallback(200, status_body("ready")));
        let job = jobs
            .wait_for_status("J1", &[JobStatusCode::Ready], WaitOptions::default())
            .await
            .unwrap();
        assert_eq!(job.id, "J1");
        assert_eq!(job.status.code, "ready");

        let requests = jobs.core.executor().transport().requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, format!("{BASE}jobs/J1"));
        assert_eq!(requests[0].headers["X-OC-TOKEN"], "tok");
    }

    #[tokio::test]
    async fn unreachable_target_is_invalid_status() {
        let jobs = endpoint(MockTransport::new().fallback(200, status_body("processing")));
        let err = jobs
            .wait_for_status("J1", &[JobStatusCode::Ready], WaitOptions::default())
            .await
            .unwrap_err();
        match &err {
            ConvertError::InvalidStatus { awaited, actual } => {
                assert_eq!(*awaited, JobStatusCode::Ready);
                assert_eq!(*actual, JobStatusCode::Processing);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        let msg = err.to_string();
        assert!(msg.contains("ready") && msg.contains("processing"));
    }

    #[tokio::test]
    async fn ready_or_incomplete_unreachable_from_processing() {
        let jobs = endpoint(MockTransport::new().fallback(200, status_body("processing")));
        let err = jobs
            .wait_for_status(
                "J1",
                &[JobStatusCode::Ready, JobStatusCode::Incomplete],
                WaitOptions::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ConvertError::InvalidStatus {
                awaited: JobStatusCode::Ready,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn failed_job_is_reported_with_payload() {
        let jobs = endpoint(MockTransport::new().fallback(200, status_body("failed")));
        let err = jobs
            .wait_for_status("J1", &[JobStatusCode::Completed], WaitOptions::default())
            .await
            .unwrap_err();
        match err {
            ConvertError::JobFailed { job_id, message } => {
                assert_eq!(job_id, "J1");
                assert_eq!(message, status_body("failed"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn failed_can_itself_be_awaited() {
        let jobs = endpoint(MockTransport::new().fallback(200, status_body("failed")));
        let job = jobs
            .wait_for_status("J1", &[JobStatusCode::Failed], WaitOptions::default())
            .await
            .unwrap();
        assert_eq!(job.status.code, "failed");
    }

    #[tokio::test]
    async fn unknown_status_aborts_wait() {
        let jobs = endpoint(MockTransport::new().fallback(200, status_body("queued")));
        let err = jobs
            .wait_for_status("J1", &[JobStatusCode::Completed], WaitOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ConvertError::UnknownStatus(ref c) if c == "queued"));
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_when_target_never_arrives() {
        let jobs = endpoint(MockTransport::new().fallback(200, status_body("ready")));
        let started = tokio::time::Instant::now();
        let err = jobs
            .wait_for_status(
                "J1",
                &[JobStatusCode::Completed],
                WaitOptions::new()
                    .with_poll_interval(Duration::from_secs(1))
                    .with_timeout(Duration::from_secs(2)),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ConvertError::Timeout { ref job_id, .. } if job_id == "J1"));
        let polls = jobs.core.executor().transport().requests().len();
        assert!(polls >= 2, "polled {polls} times");
        let waited = started.elapsed();
        assert!(waited >= Duration::from_secs(2) && waited <= Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn walks_through_intermediate_statuses() {
        let jobs = endpoint(
            MockTransport::new()
                .respond(200, status_body("downloading"))
                .respond(200, status_body("processing"))
                .respond(200, status_body("completed")),
        );
        let job = jobs
            .wait_for_status("J1", &[JobStatusCode::Completed], WaitOptions::default())
            .await
            .unwrap();
        assert_eq!(job.status.code, "completed");
        assert_eq!(jobs.core.executor().transport().requests().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_token_stops_the_wait() {
        let jobs = endpoint(MockTransport::new().fallback(200, status_body("processing")));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = jobs
            .wait_for_status(
                "J1",
                &[JobStatusCode::Completed],
                WaitOptions::new().with_cancel(cancel),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ConvertError::Cancelled(ref id) if id == "J1"));
        assert_eq!(jobs.core.executor().transport().requests().len(), 1);
    }

    #[tokio::test]
    async fn request_errors_propagate_without_polling_again() {
        let jobs = endpoint(MockTransport::new().respond(404, "not found"));
        let err = jobs
            .wait_for_status("J1", &[JobStatusCode::Completed], WaitOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ConvertError::RequestFailed { status: 404, .. }));
        assert_eq!(jobs.core.executor().transport().requests().len(), 1);
    }
}
