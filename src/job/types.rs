//! Wire types for the `jobs` resource.
//!
//! [`Job`] is a snapshot of server-owned state; the SDK never mutates a job
//! locally, it only reads what the API returns. [`JobSpec`] is what callers
//! send to create one. Fields the SDK does not model are kept in `extra` so
//! nothing the service returns is dropped.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::input::Input;
use super::status::JobStatus;
use crate::error::ConvertError;

/// `status` object of a job as reported by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusInfo {
    /// Raw status code. Parsed lazily through [`Job::status`].
    pub code: String,
    /// Free-text detail, usually empty unless the job failed.
    #[serde(default)]
    pub info: Option<String>,
}

/// A job snapshot returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub status: StatusInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback: Option<String>,
    /// Upload endpoint host; present while an upload is pending.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    #[serde(default)]
    pub input: Vec<Value>,
    #[serde(default)]
    pub conversion: Vec<Value>,
    #[serde(default)]
    pub output: Vec<Output>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Job {
    /// Validated status of this snapshot.
    pub fn status(&self) -> Result<JobStatus, ConvertError> {
        JobStatus::new(&self.status.code)
    }
}

/// One requested conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversion {
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub options: Map<String, Value>,
}

impl Conversion {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            category: None,
            options: Map::new(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }
}

/// A produced file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Output {
    pub id: String,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub checksum: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Request body used to create a job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobSpec {
    #[serde(default)]
    pub input: Vec<Input>,
    #[serde(default)]
    pub conversion: Vec<Conversion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl JobSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input(mut self, input: Input) -> Self {
        self.input.push(input);
        self
    }

    pub fn with_conversion(mut self, conversion: Conversion) -> Self {
        self.conversion.push(conversion);
        self
    }

    pub fn with_callback(mut self, url: impl Into<String>) -> Self {
        self.callback = Some(url.into());
        self
    }

    /// Nothing at all was specified.
    pub fn is_empty(&self) -> bool {
        self.input.is_empty()
            && self.conversion.is_empty()
            && self.callback.is_none()
            && self.process.is_none()
            && self.extra.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::JobStatusCode;

    #[test]
    fn job_deserialize_from_api_format() {
        let raw = r#"{
            "id": "J1",
            "token": "tok",
            "type": "job",
            "status": {"code": "completed", "info": "The file has been converted"},
            "process": true,
            "server": "https://www1.api2convert.com/v2",
            "input": [{"id": "in-1", "type": "remote"}],
            "conversion": [{"id": "c-1", "target": "png"}],
            "output": [{"id": "out-1", "uri": "https://dl/out-1", "size": 1024, "status": "enabled"}]
        }"#;
        let job: Job = serde_json::from_str(raw).unwrap();
        assert_eq!(job.id, "J1");
        assert_eq!(job.token.as_deref(), Some("tok"));
        assert_eq!(job.status().unwrap().code(), JobStatusCode::Completed);
        assert_eq!(job.output[0].size, Some(1024));
        assert_eq!(job.output[0].extra["status"], "enabled");
        assert_eq!(job.extra["type"], "job");
    }

    #[test]
    fn minimal_job_snapshot() {
        let job: Job = serde_json::from_str(r#"{"id":"J1","status":{"code":"ready"}}"#).unwrap();
        assert!(job.output.is_empty());
        assert!(job.server.is_none());
        assert_eq!(job.status.info, None);
    }

    #[test]
    fn unknown_status_surfaces_on_parse() {
        let job: Job = serde_json::from_str(r#"{"id":"J1","status":{"code":"queued"}}"#).unwrap();
        assert!(matches!(job.status(), Err(ConvertError::UnknownStatus(_))));
    }

    #[test]
    fn job_spec_wire_format() {
        let spec = JobSpec::new()
            .with_input(Input::remote("https://example.com/a.jpg"))
            .with_conversion(Conversion::new("png").with_option("width", 100))
            .with_callback("https://hooks.example.com/done");
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "input": [{"type": "remote", "source": "https://example.com/a.jpg"}],
                "conversion": [{"target": "png", "options": {"width": 100}}],
                "callback": "https://hooks.example.com/done"
            })
        );
    }

    #[test]
    fn empty_spec() {
        assert!(JobSpec::new().is_empty());
        assert!(!JobSpec::new().with_conversion(Conversion::new("pdf")).is_empty());
    }
}
