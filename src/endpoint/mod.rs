//! REST resources of the API, one struct per resource family.
//!
//! Every endpoint wraps the same [`RequestExecutor`] through an `Arc`, plus
//! the optional job token sent as `X-OC-TOKEN` on job-scoped calls.

mod conversions;
mod information;
mod inputs;
mod jobs;
mod orchestrator;
mod outputs;
mod presets;
mod statistics;
mod wait;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::client::resources::HEADER_OC_JOB_TOKEN;
use crate::client::{Headers, Method, RequestExecutor, Transport};
use crate::error::ConvertError;

pub use conversions::ConversionsEndpoint;
pub use information::InformationEndpoint;
pub use inputs::InputsEndpoint;
pub use jobs::JobsEndpoint;
pub use outputs::OutputsEndpoint;
pub use presets::PresetsEndpoint;
pub use statistics::StatisticsEndpoint;
pub use wait::{DEFAULT_POLL_INTERVAL, MAX_WAITING_TIME, WaitOptions, highest_target};

/// State shared by every endpoint.
#[derive(Debug)]
pub(crate) struct EndpointCore<T> {
    executor: Arc<RequestExecutor<T>>,
    user_token: Option<String>,
}

impl<T> Clone for EndpointCore<T> {
    fn clone(&self) -> Self {
        Self {
            executor: Arc::clone(&self.executor),
            user_token: self.user_token.clone(),
        }
    }
}

impl<T: Transport> EndpointCore<T> {
    pub(crate) fn new(executor: Arc<RequestExecutor<T>>) -> Self {
        Self {
            executor,
            user_token: None,
        }
    }

    pub(crate) fn executor(&self) -> &RequestExecutor<T> {
        &self.executor
    }

    pub(crate) fn user_token(&self) -> Option<&str> {
        self.user_token.as_deref()
    }

    pub(crate) fn set_user_token(&mut self, token: Option<String>) {
        self.user_token = token;
    }

    /// Send a request and return the raw body.
    pub(crate) async fn send_raw(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> Result<String, ConvertError> {
        self.executor
            .send(method, url, body, &token_headers(token))
            .await
    }

    /// Send a request and decode the JSON answer.
    pub(crate) async fn call<D: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> Result<D, ConvertError> {
        let raw = self.send_raw(method, url, body, token).await?;
        decode(&raw)
    }
}

pub(crate) fn token_headers(token: Option<&str>) -> Headers {
    let mut headers = Headers::new();
    if let Some(token) = token {
        headers.insert(HEADER_OC_JOB_TOKEN.to_string(), token.to_string());
    }
    headers
}

pub(crate) fn decode<D: DeserializeOwned>(raw: &str) -> Result<D, ConvertError> {
    Ok(serde_json::from_str(raw)?)
}

pub(crate) fn to_body<S: serde::Serialize>(value: &S) -> Result<Value, ConvertError> {
    Ok(serde_json::to_value(value)?)
}
