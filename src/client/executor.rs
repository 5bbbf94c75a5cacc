use std::path::Path;

use serde_json::Value;
use url::Url;

use super::resources::{
    CLIENT_USER_AGENT, HEADER_OC_API_KEY, HEADER_OC_JOB_TOKEN, HEADER_OC_SDK_CLIENT_VERSION,
    HEADER_USER_AGENT, SDK_CLIENT_VERSION,
};
use super::retry::RetryPolicy;
use super::transport::{
    Headers, HttpRequest, HttpResponse, Method, ReqwestTransport, Transport, UploadFile,
};
use crate::config::Configuration;
use crate::error::ConvertError;

/// Statuses treated as success.
pub const ACCEPTED_STATUS_CODES: [u16; 5] = [200, 201, 204, 301, 302];

/// Sends API requests: validates the verb, merges headers, resolves the URL,
/// retries transient statuses and rejects unexpected ones.
#[derive(Debug)]
pub struct RequestExecutor<T> {
    transport: T,
    base_url: Url,
    default_headers: Headers,
    retry: RetryPolicy,
}

impl RequestExecutor<ReqwestTransport> {
    /// Build the production executor from a configuration.
    ///
    /// When `api_key_prefix` is given the key must exist in the configuration.
    pub fn from_config(
        config: &Configuration,
        api_key_prefix: Option<&str>,
    ) -> Result<Self, ConvertError> {
        let transport = ReqwestTransport::new(&config.http)?;
        let base_url = Url::parse(&config.base_url())
            .map_err(|e| ConvertError::InvalidArgument(format!("invalid base url: {e}")))?;

        let mut executor = Self::new(transport, base_url).with_retry_policy(config.retry);
        if let Some(prefix) = api_key_prefix {
            executor = executor.with_api_key(config.api_key(prefix)?);
        }
        Ok(executor)
    }
}

impl<T: Transport> RequestExecutor<T> {
    pub fn new(transport: T, base_url: Url) -> Self {
        let mut default_headers = Headers::new();
        default_headers.insert(HEADER_USER_AGENT.into(), CLIENT_USER_AGENT.into());
        default_headers.insert(HEADER_OC_SDK_CLIENT_VERSION.into(), SDK_CLIENT_VERSION.into());

        Self {
            transport,
            base_url,
            default_headers,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_api_key(self, api_key: impl Into<String>) -> Self {
        self.with_header(HEADER_OC_API_KEY, api_key)
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.default_headers.get(key).map(String::as_str)
    }

    /// Like [`send`](Self::send), with the verb given as text.
    pub async fn request(
        &self,
        method: &str,
        url: &str,
        body: Option<&Value>,
        headers: &Headers,
    ) -> Result<String, ConvertError> {
        let method = method.parse::<Method>()?;
        self.send(method, url, body, headers).await
    }

    /// Send one request and return the response body.
    ///
    /// Non-GET requests always carry a JSON body; `None` is sent as `{}`.
    pub async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
        headers: &Headers,
    ) -> Result<String, ConvertError> {
        let body = if method.has_body() {
            let payload = match body {
                Some(value) => serde_json::to_string(value)?,
                None => "{}".to_string(),
            };
            Some(payload)
        } else {
            None
        };

        let request = HttpRequest {
            method,
            url: self.resolve_url(url)?,
            headers: merge_headers(&self.default_headers, headers),
            body,
        };

        tracing::debug!(method = %request.method, url = %request.url, "sending request");
        let response = self.retry.run(|| self.transport.send(&request)).await?;
        accept(response)
    }

    /// Upload a local file to `url`, optionally authorized by a job token.
    pub async fn upload_file(
        &self,
        source: &Path,
        url: &str,
        token: Option<&str>,
    ) -> Result<String, ConvertError> {
        let source = match tokio::fs::canonicalize(source).await {
            Ok(path) => path,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConvertError::FileNotFound(source.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };
        let metadata = tokio::fs::metadata(&source).await?;
        if !metadata.is_file() {
            return Err(ConvertError::FileNotFound(source));
        }

        let file = UploadFile {
            file_name: source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "file".to_string()),
            len: metadata.len(),
            path: source,
        };

        let mut extra = Headers::new();
        if let Some(token) = token {
            extra.insert(HEADER_OC_JOB_TOKEN.into(), token.into());
        }
        let headers = merge_headers(&self.default_headers, &extra);
        let url = self.resolve_url(url)?;

        tracing::debug!(url = %url, file = %file.file_name, bytes = file.len, "uploading file");
        let response = self
            .retry
            .run(|| self.transport.upload(&url, &headers, &file))
            .await?;
        accept(response)
    }

    /// Absolute URLs pass through; anything else is joined onto the base URL.
    fn resolve_url(&self, url: &str) -> Result<String, ConvertError> {
        if let Ok(absolute) = Url::parse(url)
            && matches!(absolute.scheme(), "http" | "https")
        {
            return Ok(absolute.into());
        }
        self.base_url
            .join(url)
            .map(String::from)
            .map_err(|e| ConvertError::InvalidArgument(format!("invalid url '{url}': {e}")))
    }
}

/// Merge `overrides` over `defaults`. Empty values are dropped from both
/// sides first, so an empty override never erases a default.
pub fn merge_headers(defaults: &Headers, overrides: &Headers) -> Headers {
    defaults
        .iter()
        .chain(overrides.iter())
        .filter(|(_, value)| !value.trim().is_empty())
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

fn accept(response: HttpResponse) -> Result<String, ConvertError> {
    if ACCEPTED_STATUS_CODES.contains(&response.status) {
        Ok(response.body)
    } else {
        Err(ConvertError::RequestFailed {
            status: response.status,
            body: response.body,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::time::Duration;

    use super::*;
    use crate::client::mock::MockTransport;

    fn executor(transport: MockTransport) -> RequestExecutor<MockTransport> {
        RequestExecutor::new(transport, Url::parse("https://api.test/v2/").unwrap())
            .with_api_key("secret")
    }

    fn token(value: &str) -> Headers {
        Headers::from([(HEADER_OC_JOB_TOKEN.to_string(), value.to_string())])
    }

    #[test]
    fn merge_prefers_overrides_and_strips_empty() {
        let defaults = Headers::from([
            ("User-Agent".to_string(), "sdk".to_string()),
            ("X-OC-TOKEN".to_string(), "old".to_string()),
            ("X-Empty".to_string(), String::new()),
        ]);
        let overrides = Headers::from([
            ("X-OC-TOKEN".to_string(), "new".to_string()),
            ("X-Blank".to_string(), "  ".to_string()),
        ]);
        let merged = merge_headers(&defaults, &overrides);
        assert_eq!(
            merged,
            Headers::from([
                ("User-Agent".to_string(), "sdk".to_string()),
                ("X-OC-TOKEN".to_string(), "new".to_string()),
            ])
        );
    }

    #[test]
    fn empty_override_keeps_default() {
        let defaults = Headers::from([("X-OC-TOKEN".to_string(), "keep".to_string())]);
        let merged = merge_headers(&defaults, &token(""));
        assert_eq!(merged["X-OC-TOKEN"], "keep");
    }

    #[tokio::test]
    async fn get_sends_no_body_and_default_headers() {
        let exec = executor(MockTransport::new().respond(200, r#"{"ok":true}"#));
        let body = exec.send(Method::Get, "jobs/J1", None, &token("tok")).await.unwrap();
        assert_eq!(body, r#"{"ok":true}"#);

        let requests = exec.transport().requests();
        assert_eq!(requests.len(), 1);
        let req = &requests[0];
        assert_eq!(req.method, Some(Method::Get));
        assert_eq!(req.url, "https://api.test/v2/jobs/J1");
        assert_eq!(req.body, None);
        assert_eq!(req.headers[HEADER_OC_API_KEY], "secret");
        assert_eq!(req.headers[HEADER_OC_JOB_TOKEN], "tok");
        assert_eq!(req.headers[HEADER_OC_SDK_CLIENT_VERSION], "2");
        assert!(req.headers.contains_key(HEADER_USER_AGENT));
    }

    #[tokio::test]
    async fn post_serializes_json_body() {
        let exec = executor(MockTransport::new().respond(201, "{}"));
        let payload = serde_json::json!({"process": false});
        exec.send(Method::Post, "jobs", Some(&payload), &Headers::new())
            .await
            .unwrap();
        let req = &exec.transport().requests()[0];
        assert_eq!(req.body.as_deref(), Some(r#"{"process":false}"#));
    }

    #[tokio::test]
    async fn delete_without_body_sends_empty_object() {
        let exec = executor(MockTransport::new().respond(204, ""));
        exec.send(Method::Delete, "jobs/J1", None, &Headers::new())
            .await
            .unwrap();
        assert_eq!(exec.transport().requests()[0].body.as_deref(), Some("{}"));
    }

    #[tokio::test]
    async fn head_is_rejected_before_transport() {
        let exec = executor(MockTransport::new().respond(200, "{}"));
        let err = exec
            .request("HEAD", "jobs", None, &Headers::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ConvertError::MethodNotAllowed(ref m) if m == "HEAD"));
        assert!(exec.transport().requests().is_empty());
    }

    #[tokio::test]
    async fn unexpected_status_is_request_failed() {
        let exec = executor(MockTransport::new().respond(404, "no such job"));
        let err = exec
            .send(Method::Get, "jobs/missing", None, &Headers::new())
            .await
            .unwrap_err();
        match err {
            ConvertError::RequestFailed { status, body } => {
                assert_eq!(status, 404);
                assert_eq!(body, "no such job");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn redirect_statuses_are_accepted() {
        let exec = executor(MockTransport::new().respond(302, "moved"));
        let body = exec.send(Method::Get, "jobs", None, &Headers::new()).await.unwrap();
        assert_eq!(body, "moved");
    }

    #[tokio::test(start_paused = true)]
    async fn retries_twice_then_succeeds() {
        let exec = executor(
            MockTransport::new()
                .respond(429, "slow down")
                .respond(429, "slow down")
                .respond(200, "{}"),
        );
        let body = exec.send(Method::Get, "jobs", None, &Headers::new()).await.unwrap();
        assert_eq!(body, "{}");
        assert_eq!(exec.transport().requests().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_exhaustion_fails_after_five_attempts() {
        let exec = executor(MockTransport::new().fallback(429, "slow down"));
        let started = tokio::time::Instant::now();
        let err = exec
            .send(Method::Get, "jobs", None, &Headers::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ConvertError::RequestFailed { status: 429, .. }));
        assert_eq!(exec.transport().requests().len(), 5);
        assert!(started.elapsed() >= Duration::from_secs(1 + 2 + 3 + 4));
    }

    #[tokio::test]
    async fn absolute_urls_bypass_base() {
        let exec = executor(MockTransport::new().respond(200, "{}"));
        exec.send(Method::Get, "https://other.test/x", None, &Headers::new())
            .await
            .unwrap();
        assert_eq!(exec.transport().requests()[0].url, "https://other.test/x");
    }

    #[tokio::test]
    async fn upload_missing_file_is_file_not_found() {
        let exec = executor(MockTransport::new().respond(200, "{}"));
        let err = exec
            .upload_file(
                Path::new("/definitely/not/here.png"),
                "https://up.test/upload-file/J1",
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ConvertError::FileNotFound(_)));
        assert!(exec.transport().requests().is_empty());
    }

    #[tokio::test]
    async fn upload_sends_file_and_token() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        file.write_all(b"hello").unwrap();

        let exec = executor(MockTransport::new().respond(200, r#"{"id":"in-1"}"#));
        let body = exec
            .upload_file(file.path(), "https://up.test/upload-file/J1", Some("tok"))
            .await
            .unwrap();
        assert_eq!(body, r#"{"id":"in-1"}"#);

        let req = &exec.transport().requests()[0];
        assert_eq!(req.method, None);
        assert_eq!(req.url, "https://up.test/upload-file/J1");
        assert_eq!(req.headers[HEADER_OC_JOB_TOKEN], "tok");
        let upload = req.upload.as_ref().unwrap();
        assert_eq!(upload.len, 5);
        assert_eq!(std::fs::read(&upload.path).unwrap(), b"hello");
        assert!(upload.file_name.ends_with(".txt"));
    }
}
