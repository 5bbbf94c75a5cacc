use std::sync::Arc;

use serde_json::Value;

use super::{EndpointCore, decode, to_body};
use crate::client::resources::{JOB_ID_INPUT_ID, JOB_ID_INPUTS, UPLOAD_FILE};
use crate::client::{Method, RequestExecutor, Transport, generate_url};
use crate::error::ConvertError;
use crate::job::{Input, Job};

/// Inputs attached to an existing job.
#[derive(Debug, Clone)]
pub struct InputsEndpoint<T> {
    core: EndpointCore<T>,
}

impl<T: Transport> InputsEndpoint<T> {
    pub fn new(executor: Arc<RequestExecutor<T>>) -> Self {
        Self {
            core: EndpointCore::new(executor),
        }
    }

    pub fn with_user_token(mut self, token: impl Into<String>) -> Self {
        self.core.set_user_token(Some(token.into()));
        self
    }

    /// Add one input to `job`. Uploads go to the job's upload server with
    /// the job token; every other kind is posted to the job's inputs.
    pub async fn post_job_input(&self, input: &Input, job: &Job) -> Result<Value, ConvertError> {
        if job.id.trim().is_empty() {
            return Err(ConvertError::InvalidArgument("job id is mandatory".into()));
        }

        match input {
            Input::Upload { source } => {
                let server = job.server.as_deref().ok_or_else(|| {
                    ConvertError::InvalidArgument("job server is mandatory".into())
                })?;
                let token = job
                    .token
                    .as_deref()
                    .ok_or_else(|| ConvertError::InvalidArgument("job token is mandatory".into()))?;
                let url =
                    generate_url(UPLOAD_FILE, &[("server", server), ("job_id", &job.id)], &[]);
                let raw = self.core.executor().upload_file(source, &url, Some(token)).await?;
                decode(&raw)
            }
            Input::GdrivePicker { credentials, .. } if !has_token(credentials) => Err(
                ConvertError::InvalidArgument("credentials with token are mandatory".into()),
            ),
            other => {
                let url = generate_url(JOB_ID_INPUTS, &[("job_id", &job.id)], &[]);
                let body = to_body(other)?;
                self.core
                    .call(Method::Post, &url, Some(&body), self.core.user_token())
                    .await
            }
        }
    }

    /// Post several non-upload inputs in one request.
    pub async fn post_job_inputs(
        &self,
        inputs: &[Input],
        job: &Job,
    ) -> Result<Value, ConvertError> {
        if inputs.is_empty() {
            return Err(ConvertError::InvalidArgument("input source is mandatory".into()));
        }
        if inputs.iter().any(Input::is_upload) {
            return Err(ConvertError::InvalidArgument(
                "upload inputs must be posted one by one".into(),
            ));
        }
        let url = generate_url(JOB_ID_INPUTS, &[("job_id", &job.id)], &[]);
        let body = to_body(&inputs)?;
        self.core
            .call(Method::Post, &url, Some(&body), self.core.user_token())
            .await
    }

    pub async fn get_job_inputs(&self, job_id: &str) -> Result<Vec<Value>, ConvertError> {
        let url = generate_url(JOB_ID_INPUTS, &[("job_id", job_id)], &[]);
        self.core
            .call(Method::Get, &url, None, self.core.user_token())
            .await
    }

    pub async fn get_job_input(&self, job_id: &str, input_id: &str) -> Result<Value, ConvertError> {
        let url = generate_url(JOB_ID_INPUT_ID, &[("job_id", job_id), ("input_id", input_id)], &[]);
        self.core
            .call(Method::Get, &url, None, self.core.user_token())
            .await
    }

    pub async fn patch_job_input(
        &self,
        job_id: &str,
        input_id: &str,
        patch: &Value,
    ) -> Result<Value, ConvertError> {
        let url = generate_url(JOB_ID_INPUT_ID, &[("job_id", job_id), ("input_id", input_id)], &[]);
        self.core
            .call(Method::Patch, &url, Some(patch), self.core.user_token())
            .await
    }

    pub async fn delete_job_input(&self, job_id: &str, input_id: &str) -> Result<(), ConvertError> {
        let url = generate_url(JOB_ID_INPUT_ID, &[("job_id", job_id), ("input_id", input_id)], &[]);
        self.core
            .send_raw(Method::Delete, &url, None, self.core.user_token())
            .await?;
        Ok(())
    }
}

fn has_token(credentials: &serde_json::Map<String, Value>) -> bool {
    credentials
        .get("token")
        .and_then(Value::as_str)
        .is_some_and(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serde_json::{Map, json};

    use super::*;
    use crate::client::mock::MockTransport;
    use crate::endpoint::test_support::{BASE, executor};
    use crate::job::Engine;

    fn job(server: Option<&str>) -> Job {
        serde_json::from_value(json!({
            "id": "J1",
            "token": "job-token",
            "server": server,
            "status": {"code": "incomplete"}
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn remote_input_is_posted_to_job_inputs() {
        let exec = executor(MockTransport::new().respond(201, r#"{"id":"in-1"}"#));
        let inputs = InputsEndpoint::new(exec.clone()).with_user_token("tok");
        let input = Input::remote_with_engine("https://example.com/page", Engine::Screenshot);

        let created = inputs.post_job_input(&input, &job(None)).await.unwrap();
        assert_eq!(created["id"], "in-1");

        let req = &exec.transport().requests()[0];
        assert_eq!(req.url, format!("{BASE}jobs/J1/input"));
        assert_eq!(req.json_body()["engine"], "screenshot");
        assert_eq!(req.headers["X-OC-TOKEN"], "tok");
    }

    #[tokio::test]
    async fn upload_requires_server() {
        let exec = executor(MockTransport::new());
        let inputs = InputsEndpoint::new(exec.clone());
        let err = inputs
            .post_job_input(&Input::upload("/tmp/x.png"), &job(None))
            .await
            .unwrap_err();
        assert!(matches!(err, ConvertError::InvalidArgument(ref m) if m.contains("server")));
    }

    #[tokio::test]
    async fn upload_goes_to_job_server() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"data").unwrap();

        let exec = executor(MockTransport::new().respond(200, r#"{"id":"in-2"}"#));
        let inputs = InputsEndpoint::new(exec.clone());
        inputs
            .post_job_input(&Input::upload(file.path()), &job(Some("https://up.test/srv")))
            .await
            .unwrap();

        let req = &exec.transport().requests()[0];
        assert_eq!(req.url, "https://up.test/srv/upload-file/J1");
        assert_eq!(req.headers["X-OC-TOKEN"], "job-token");
    }

    #[tokio::test]
    async fn gdrive_picker_needs_credential_token() {
        let exec = executor(MockTransport::new());
        let inputs = InputsEndpoint::new(exec.clone());
        let input = Input::GdrivePicker {
            source: "file-id".into(),
            filename: String::new(),
            content_type: String::new(),
            credentials: Map::new(),
        };
        let err = inputs.post_job_input(&input, &job(None)).await.unwrap_err();
        assert!(matches!(err, ConvertError::InvalidArgument(_)));
        assert!(exec.transport().requests().is_empty());
    }

    #[tokio::test]
    async fn batch_post_rejects_uploads() {
        let exec = executor(MockTransport::new().respond(201, "[]"));
        let inputs = InputsEndpoint::new(exec.clone());

        let err = inputs
            .post_job_inputs(&[Input::upload("/tmp/a.png")], &job(None))
            .await
            .unwrap_err();
        assert!(matches!(err, ConvertError::InvalidArgument(_)));

        inputs
            .post_job_inputs(
                &[Input::remote("https://a"), Input::remote("https://b")],
                &job(None),
            )
            .await
            .unwrap();
        let body = exec.transport().requests()[0].json_body();
        assert_eq!(body.as_array().unwrap().len(), 2);
    }
}
