use std::sync::Arc;

use serde_json::{Map, Value, json};

use super::EndpointCore;
use crate::client::resources::{PRESET_ID, PRESETS};
use crate::client::{Method, RequestExecutor, Transport, generate_url};
use crate::error::ConvertError;

/// Saved conversion option sets.
#[derive(Debug, Clone)]
pub struct PresetsEndpoint<T> {
    core: EndpointCore<T>,
}

impl<T: Transport> PresetsEndpoint<T> {
    pub fn new(executor: Arc<RequestExecutor<T>>) -> Self {
        Self {
            core: EndpointCore::new(executor),
        }
    }

    /// Search presets. Empty criteria are left out of the query.
    pub async fn find_presets(
        &self,
        filter: &str,
        category: &str,
        target: &str,
    ) -> Result<Vec<Value>, ConvertError> {
        let criteria = [("filter", filter), ("category", category), ("target", target)];
        let query: Vec<(&str, &str)> = criteria
            .into_iter()
            .filter(|(_, v)| !v.is_empty())
            .collect();
        let url = generate_url(PRESETS, &[], &query);
        self.core.call(Method::Get, &url, None, None).await
    }

    pub async fn save_preset(
        &self,
        name: &str,
        target: &str,
        options: Map<String, Value>,
    ) -> Result<Value, ConvertError> {
        let body = json!({ "name": name, "target": target, "options": options });
        self.core.call(Method::Post, PRESETS, Some(&body), None).await
    }

    /// Rename a preset.
    pub async fn update_preset(&self, preset_id: &str, name: &str) -> Result<Value, ConvertError> {
        let url = generate_url(PRESET_ID, &[("preset_id", preset_id)], &[]);
        let body = json!({ "name": name });
        self.core.call(Method::Patch, &url, Some(&body), None).await
    }

    pub async fn get_preset(&self, preset_id: &str) -> Result<Value, ConvertError> {
        let url = generate_url(PRESET_ID, &[("preset_id", preset_id)], &[]);
        self.core.call(Method::Get, &url, None, None).await
    }

    pub async fn delete_preset(&self, preset_id: &str) -> Result<(), ConvertError> {
        let url = generate_url(PRESET_ID, &[("preset_id", preset_id)], &[]);
        self.core.send_raw(Method::Delete, &url, None, None).await?;
        Ok(())
    }
}
