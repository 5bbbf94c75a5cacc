use std::sync::Arc;

use super::EndpointCore;
use crate::client::resources::{JOB_ID_OUTPUT_ID, JOB_ID_OUTPUTS};
use crate::client::{Method, RequestExecutor, Transport, generate_url};
use crate::error::ConvertError;
use crate::job::Output;

/// Files produced by a job.
#[derive(Debug, Clone)]
pub struct OutputsEndpoint<T> {
    core: EndpointCore<T>,
}

impl<T: Transport> OutputsEndpoint<T> {
    pub fn new(executor: Arc<RequestExecutor<T>>) -> Self {
        Self {
            core: EndpointCore::new(executor),
        }
    }

    pub fn with_user_token(mut self, token: impl Into<String>) -> Self {
        self.core.set_user_token(Some(token.into()));
        self
    }

    pub async fn get_job_outputs(&self, job_id: &str) -> Result<Vec<Output>, ConvertError> {
        let url = generate_url(JOB_ID_OUTPUTS, &[("job_id", job_id)], &[]);
        self.core
            .call(Method::Get, &url, None, self.core.user_token())
            .await
    }

    pub async fn get_job_output(
        &self,
        job_id: &str,
        output_id: &str,
    ) -> Result<Output, ConvertError> {
        let url = output_url(job_id, output_id);
        self.core
            .call(Method::Get, &url, None, self.core.user_token())
            .await
    }

    pub async fn delete_job_output(
        &self,
        job_id: &str,
        output_id: &str,
    ) -> Result<(), ConvertError> {
        let url = output_url(job_id, output_id);
        self.core
            .send_raw(Method::Delete, &url, None, self.core.user_token())
            .await?;
        Ok(())
    }
}

fn output_url(job_id: &str, output_id: &str) -> String {
    generate_url(
        JOB_ID_OUTPUT_ID,
        &[("job_id", job_id), ("output_id", output_id)],
        &[],
    )
}
