//! Request description and retry bookkeeping.

use reqwest::Method;
use serde::Serialize;

use crate::error::Result;

/// Which host a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Host {
    /// The locale-prefixed API host.
    Api,
    /// The upload host (no locale prefix).
    Upload,
}

/// A file payload for multipart upload.
///
/// Bytes are held in memory so the form can be rebuilt for the one
/// post-refresh resend; multipart bodies are not otherwise replayable.
#[derive(Debug, Clone)]
pub struct UploadPayload {
    pub field: String,
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
enum Body {
    None,
    Json(serde_json::Value),
    Multipart(UploadPayload),
}

/// Declarative description of one API call, replayable across attempts.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    host: Host,
    path: String,
    query: Vec<(String, String)>,
    body: Body,
    /// Auth-exempt routes (login, refresh, logout) never enter the refresh
    /// protocol; their 401s pass through as plain errors.
    auth_exempt: bool,
}

impl ApiRequest {
    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            host: Host::Api,
            path: path.into(),
            query: Vec::new(),
            body: Body::None,
            auth_exempt: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Multipart upload against the upload host.
    pub fn upload(path: impl Into<String>, payload: UploadPayload) -> Self {
        let mut request = Self::new(Method::POST, path);
        request.host = Host::Upload;
        request.body = Body::Multipart(payload);
        request
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn json(mut self, body: &impl Serialize) -> Result<Self> {
        self.body = Body::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Mark this request as outside the refresh protocol.
    pub fn exempt_from_auth(mut self) -> Self {
        self.auth_exempt = true;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn host(&self) -> Host {
        self.host
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_params(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn auth_exempt(&self) -> bool {
        self.auth_exempt
    }

    /// Attach this request's body to a builder, rebuilding multipart forms
    /// fresh for each attempt.
    pub(crate) fn apply_body(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder> {
        match &self.body {
            Body::None => Ok(builder),
            Body::Json(value) => Ok(builder.json(value)),
            Body::Multipart(payload) => {
                let part = reqwest::multipart::Part::bytes(payload.bytes.clone())
                    .file_name(payload.file_name.clone())
                    .mime_str(&payload.mime)
                    .map_err(crate::error::Error::Network)?;
                let form = reqwest::multipart::Form::new().part(payload.field.clone(), part);
                Ok(builder.multipart(form))
            }
        }
    }
}

/// One pass of a request through the pipeline.
///
/// Retry state is explicit data here rather than a flag smuggled onto a
/// library request object: the pipeline constructs a fresh attempt for the
/// single post-refresh resend.
pub struct RequestAttempt<'a> {
    request: &'a ApiRequest,
    retry_count: u8,
    bearer_override: Option<String>,
}

impl<'a> RequestAttempt<'a> {
    pub fn first(request: &'a ApiRequest) -> Self {
        Self {
            request,
            retry_count: 0,
            bearer_override: None,
        }
    }

    /// The follow-up attempt after a successful refresh.
    pub fn retried(&self) -> Self {
        Self {
            request: self.request,
            retry_count: self.retry_count + 1,
            bearer_override: None,
        }
    }

    /// Pin the bearer token for this attempt instead of re-reading the
    /// store (the coordinator hands the retried request its token).
    pub fn with_bearer(mut self, token: &str) -> Self {
        self.bearer_override = Some(token.to_string());
        self
    }

    pub fn request(&self) -> &ApiRequest {
        self.request
    }

    pub fn retry_count(&self) -> u8 {
        self.retry_count
    }

    pub fn already_retried(&self) -> bool {
        self.retry_count > 0
    }

    pub fn bearer(&self) -> Option<&str> {
        self.bearer_override.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_accumulates_parts() {
        let request = ApiRequest::get("projects")
            .query("page", 2)
            .query("size", 20);

        assert_eq!(request.method(), &Method::GET);
        assert_eq!(request.host(), Host::Api);
        assert_eq!(request.path(), "projects");
        assert_eq!(request.query_params().len(), 2);
        assert!(!request.auth_exempt());
    }

    #[test]
    fn upload_targets_upload_host() {
        let request = ApiRequest::upload(
            "documents",
            UploadPayload {
                field: "file".into(),
                file_name: "plan.pdf".into(),
                mime: "application/pdf".into(),
                bytes: vec![1, 2, 3],
            },
        );
        assert_eq!(request.host(), Host::Upload);
    }

    #[test]
    fn attempt_retry_bookkeeping() {
        let request = ApiRequest::get("projects");
        let first = RequestAttempt::first(&request);
        assert_eq!(first.retry_count(), 0);
        assert!(!first.already_retried());

        let second = first.retried().with_bearer("fresh");
        assert_eq!(second.retry_count(), 1);
        assert!(second.already_retried());
        assert_eq!(second.bearer(), Some("fresh"));
    }
}
