//! Scripted in-memory transport for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use super::transport::{Headers, HttpRequest, HttpResponse, Method, Transport, UploadFile};
use crate::error::ConvertError;

/// What the mock saw. `method` is `None` for multipart uploads.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Option<Method>,
    pub url: String,
    pub headers: Headers,
    pub body: Option<String>,
    pub upload: Option<UploadFile>,
}

impl RecordedRequest {
    pub fn json_body(&self) -> serde_json::Value {
        serde_json::from_str(self.body.as_deref().unwrap_or("null")).unwrap()
    }
}

/// Answers requests from a queue, then from an optional fallback.
#[derive(Debug, Default)]
pub struct MockTransport {
    queue: Mutex<VecDeque<HttpResponse>>,
    fallback: Option<HttpResponse>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, status: u16, body: impl Into<String>) -> Self {
        self.queue
            .lock()
            .unwrap()
            .push_back(HttpResponse::new(status, body));
        self
    }

    pub fn respond_json(self, status: u16, body: serde_json::Value) -> Self {
        self.respond(status, body.to_string())
    }

    pub fn fallback(mut self, status: u16, body: impl Into<String>) -> Self {
        self.fallback = Some(HttpResponse::new(status, body));
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// `"GET jobs/J1"`-style summary of every request, for ordering checks.
    pub fn trace(&self, base: &str) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| {
                let verb = r.method.map(|m| m.as_str()).unwrap_or("UPLOAD");
                let path = r.url.strip_prefix(base).unwrap_or(&r.url);
                format!("{verb} {path}")
            })
            .collect()
    }

    fn next(&self, recorded: RecordedRequest) -> Result<HttpResponse, ConvertError> {
        self.requests.lock().unwrap().push(recorded);
        let queued = self.queue.lock().unwrap().pop_front();
        Ok(queued
            .or_else(|| self.fallback.clone())
            .unwrap_or_else(|| HttpResponse::new(500, "mock transport exhausted")))
    }
}

impl Transport for MockTransport {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ConvertError> {
        self.next(RecordedRequest {
            method: Some(request.method),
            url: request.url.clone(),
            headers: request.headers.clone(),
            body: request.body.clone(),
            upload: None,
        })
    }

    async fn upload(
        &self,
        url: &str,
        headers: &Headers,
        file: &UploadFile,
    ) -> Result<HttpResponse, ConvertError> {
        self.next(RecordedRequest {
            method: None,
            url: url.to_string(),
            headers: headers.clone(),
            body: None,
            upload: Some(file.clone()),
        })
    }
}
