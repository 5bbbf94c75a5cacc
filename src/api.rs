//! Entry point bundling every endpoint over one shared executor.

use std::sync::Arc;

use crate::callback::CallbackHandler;
use crate::client::{ReqwestTransport, RequestExecutor, Transport};
use crate::config::Configuration;
use crate::endpoint::{
    ConversionsEndpoint, InformationEndpoint, InputsEndpoint, JobsEndpoint, OutputsEndpoint,
    PresetsEndpoint, StatisticsEndpoint, WaitOptions,
};
use crate::error::ConvertError;
use crate::job::{Job, JobSpec, Output};

#[derive(Debug)]
pub struct Api<T> {
    jobs: JobsEndpoint<T>,
    inputs: InputsEndpoint<T>,
    conversions: ConversionsEndpoint<T>,
    outputs: OutputsEndpoint<T>,
    information: InformationEndpoint<T>,
    presets: PresetsEndpoint<T>,
    statistics: StatisticsEndpoint<T>,
    callback: CallbackHandler,
    job_created: Option<Job>,
}

impl Api<ReqwestTransport> {
    /// Build an API over HTTP using the key stored under `api_key_prefix`.
    pub fn from_config(config: &Configuration, api_key_prefix: &str) -> Result<Self, ConvertError> {
        let executor = RequestExecutor::from_config(config, Some(api_key_prefix))?;
        let wait = WaitOptions::new()
            .with_poll_interval(config.wait.poll_interval())
            .with_timeout(config.wait.timeout());
        Ok(Self::new(Arc::new(executor), config.async_mode).with_wait_defaults(wait))
    }
}

impl<T: Transport> Api<T> {
    pub fn new(executor: Arc<RequestExecutor<T>>, async_mode: bool) -> Self {
        Self {
            jobs: JobsEndpoint::new(Arc::clone(&executor)).with_async(async_mode),
            inputs: InputsEndpoint::new(Arc::clone(&executor)),
            conversions: ConversionsEndpoint::new(Arc::clone(&executor)),
            outputs: OutputsEndpoint::new(Arc::clone(&executor)),
            information: InformationEndpoint::new(Arc::clone(&executor)),
            presets: PresetsEndpoint::new(Arc::clone(&executor)),
            statistics: StatisticsEndpoint::new(executor),
            callback: CallbackHandler::new(),
            job_created: None,
        }
    }

    /// Send `token` as `X-OC-TOKEN` on every job-scoped call.
    pub fn with_user_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.jobs = self.jobs.with_user_token(token.clone());
        self.inputs = self.inputs.with_user_token(token.clone());
        self.conversions = self.conversions.with_user_token(token.clone());
        self.outputs = self.outputs.with_user_token(token);
        self
    }

    pub fn with_wait_defaults(mut self, options: WaitOptions) -> Self {
        self.jobs = self.jobs.with_wait_defaults(options);
        self
    }

    pub fn is_async(&self) -> bool {
        self.jobs.is_async()
    }

    pub fn jobs(&self) -> &JobsEndpoint<T> {
        &self.jobs
    }

    pub fn inputs(&self) -> &InputsEndpoint<T> {
        &self.inputs
    }

    pub fn conversions(&self) -> &ConversionsEndpoint<T> {
        &self.conversions
    }

    pub fn outputs(&self) -> &OutputsEndpoint<T> {
        &self.outputs
    }

    pub fn information(&self) -> &InformationEndpoint<T> {
        &self.information
    }

    pub fn presets(&self) -> &PresetsEndpoint<T> {
        &self.presets
    }

    pub fn statistics(&self) -> &StatisticsEndpoint<T> {
        &self.statistics
    }

    pub fn callback(&self) -> &CallbackHandler {
        &self.callback
    }

    /// Create, feed and (unless async) finish a job. The result is also kept
    /// and available through [`Api::job_created`].
    pub async fn post_full_job(&mut self, spec: JobSpec) -> Result<&Job, ConvertError> {
        let job = self.jobs.post_full_job(spec).await?;
        Ok(self.job_created.insert(job))
    }

    /// Last job returned by [`Api::post_full_job`].
    pub fn job_created(&self) -> Option<&Job> {
        self.job_created.as_ref()
    }

    pub async fn get_job(&self, job_id: &str) -> Result<Job, ConvertError> {
        self.jobs.get_job(job_id).await
    }

    pub async fn get_job_outputs(&self, job_id: &str) -> Result<Vec<Output>, ConvertError> {
        self.outputs.get_job_outputs(job_id).await
    }

    pub async fn get_conversion_info(
        &self,
        target: &str,
        category: Option<&str>,
    ) -> Result<Option<serde_json::Value>, ConvertError> {
        self.information.get_conversion_schema(target, category).await
    }
}
