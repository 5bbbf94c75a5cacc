use std::sync::Arc;

use serde_json::Value;

use super::{EndpointCore, to_body};
use crate::client::resources::{JOB_ID_CONVERSION_ID, JOB_ID_CONVERSIONS};
use crate::client::{Method, RequestExecutor, Transport, generate_url};
use crate::error::ConvertError;
use crate::job::Conversion;

/// Conversions attached to an existing job.
#[derive(Debug, Clone)]
pub struct ConversionsEndpoint<T> {
    core: EndpointCore<T>,
}

impl<T: Transport> ConversionsEndpoint<T> {
    pub fn new(executor: Arc<RequestExecutor<T>>) -> Self {
        Self {
            core: EndpointCore::new(executor),
        }
    }

    pub fn with_user_token(mut self, token: impl Into<String>) -> Self {
        self.core.set_user_token(Some(token.into()));
        self
    }

    pub async fn post_job_conversion(
        &self,
        job_id: &str,
        conversion: &Conversion,
    ) -> Result<Value, ConvertError> {
        let url = generate_url(JOB_ID_CONVERSIONS, &[("job_id", job_id)], &[]);
        let body = to_body(conversion)?;
        self.core
            .call(Method::Post, &url, Some(&body), self.core.user_token())
            .await
    }

    pub async fn post_job_conversions(
        &self,
        job_id: &str,
        conversions: &[Conversion],
    ) -> Result<Value, ConvertError> {
        let url = generate_url(JOB_ID_CONVERSIONS, &[("job_id", job_id)], &[]);
        let body = to_body(&conversions)?;
        self.core
            .call(Method::Post, &url, Some(&body), self.core.user_token())
            .await
    }

    pub async fn patch_job_conversion(
        &self,
        job_id: &str,
        conversion_id: &str,
        patch: &Value,
    ) -> Result<Value, ConvertError> {
        let url = conversion_url(job_id, conversion_id);
        self.core
            .call(Method::Patch, &url, Some(patch), self.core.user_token())
            .await
    }

    pub async fn get_job_conversions(&self, job_id: &str) -> Result<Vec<Value>, ConvertError> {
        let url = generate_url(JOB_ID_CONVERSIONS, &[("job_id", job_id)], &[]);
        self.core
            .call(Method::Get, &url, None, self.core.user_token())
            .await
    }

    pub async fn get_job_conversion(
        &self,
        job_id: &str,
        conversion_id: &str,
    ) -> Result<Value, ConvertError> {
        let url = conversion_url(job_id, conversion_id);
        self.core
            .call(Method::Get, &url, None, self.core.user_token())
            .await
    }

    pub async fn delete_job_conversion(
        &self,
        job_id: &str,
        conversion_id: &str,
    ) -> Result<(), ConvertError> {
        let url = conversion_url(job_id, conversion_id);
        self.core
            .send_raw(Method::Delete, &url, None, self.core.user_token())
            .await?;
        Ok(())
    }
}

fn conversion_url(job_id: &str, conversion_id: &str) -> String {
    generate_url(
        JOB_ID_CONVERSION_ID,
        &[("job_id", job_id), ("conversion_id", conversion_id)],
        &[],
    )
}
