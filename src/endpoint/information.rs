use std::sync::Arc;

use serde_json::Value;

use super::EndpointCore;
use crate::client::resources::{CONVERSIONS, SCHEMA, STATUSES};
use crate::client::{Method, RequestExecutor, Transport, generate_url};
use crate::error::ConvertError;

/// Read-only metadata about the API itself.
#[derive(Debug, Clone)]
pub struct InformationEndpoint<T> {
    core: EndpointCore<T>,
}

impl<T: Transport> InformationEndpoint<T> {
    pub fn new(executor: Arc<RequestExecutor<T>>) -> Self {
        Self {
            core: EndpointCore::new(executor),
        }
    }

    pub async fn get_schema(&self) -> Result<Value, ConvertError> {
        self.core.call(Method::Get, SCHEMA, None, None).await
    }

    pub async fn get_statuses(&self) -> Result<Vec<Value>, ConvertError> {
        self.core.call(Method::Get, STATUSES, None, None).await
    }

    pub async fn get_conversions(&self) -> Result<Vec<Value>, ConvertError> {
        self.core.call(Method::Get, CONVERSIONS, None, None).await
    }

    /// Options schema of one conversion target. `None` when the service
    /// knows no such conversion.
    pub async fn get_conversion_schema(
        &self,
        target: &str,
        category: Option<&str>,
    ) -> Result<Option<Value>, ConvertError> {
        let mut query = vec![("target", target)];
        if let Some(category) = category.filter(|c| !c.is_empty()) {
            query.push(("category", category));
        }
        let url = generate_url(CONVERSIONS, &[], &query);
        let list: Vec<Value> = self.core.call(Method::Get, &url, None, None).await?;
        Ok(list.into_iter().next())
    }
}
