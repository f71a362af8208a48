//! Authenticated request pipeline.
//!
//! Every API call goes through [`AuthenticatedClient::execute`]: the bearer
//! token is attached from the credential store, the locale-dependent base
//! endpoint is re-resolved per request, and a 401 on a protected route runs
//! the refresh protocol with exactly one resend. All other failures are
//! classified and passed through to the caller unchanged.

mod request;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::cookie::Jar;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use rustls::crypto::ring;
use rustls_platform_verifier::BuilderVerifierExt;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::credentials::CredentialStore;
use crate::error::{Error, Result};
use crate::session::{
    RefreshBackend, RefreshCoordinator, RefreshedSession, SessionEvent, SessionEvents,
};

pub use request::{ApiRequest, Host, RequestAttempt, UploadPayload};

/// Maximum error-body length read back for diagnostics.
const ERROR_BODY_LIMIT: usize = 4096;

/// The HTTP pipeline every endpoint group sends through.
pub struct AuthenticatedClient {
    http: reqwest::Client,
    config: Arc<ClientConfig>,
    store: Arc<CredentialStore>,
    coordinator: Arc<RefreshCoordinator>,
    events: SessionEvents,
}

impl AuthenticatedClient {
    /// Build the pipeline, wiring the shared cookie jar into the underlying
    /// client and giving the refresh coordinator its raw backend.
    pub fn new(
        config: Arc<ClientConfig>,
        store: Arc<CredentialStore>,
        jar: Arc<Jar>,
        events: SessionEvents,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .cookie_provider(jar)
            .default_headers(headers)
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .use_preconfigured_tls(build_tls_config()?)
            .build()?;

        let backend = Arc::new(HttpRefreshBackend {
            http: http.clone(),
            config: Arc::clone(&config),
        });
        let coordinator = Arc::new(RefreshCoordinator::new(
            Arc::clone(&store),
            backend,
            events.clone(),
        ));

        Ok(Self {
            http,
            config,
            store,
            coordinator,
            events,
        })
    }

    pub fn config(&self) -> &Arc<ClientConfig> {
        &self.config
    }

    pub fn store(&self) -> &Arc<CredentialStore> {
        &self.store
    }

    pub fn events(&self) -> &SessionEvents {
        &self.events
    }

    /// Execute a request through the full interception chain and return the
    /// raw response once it is known to be a success.
    pub async fn execute(&self, request: ApiRequest) -> Result<reqwest::Response> {
        let attempt = RequestAttempt::first(&request);
        let response = self.dispatch(&attempt).await?;

        if response.status() != StatusCode::UNAUTHORIZED || request.auth_exempt() {
            return Self::into_classified(response).await;
        }

        debug!(path = %request.path(), "Authorization failure; delegating to refresh coordinator");
        // Coordinator errors mean forced logout already happened; propagate.
        let token = self.coordinator.handle_auth_failure().await?;

        let retry = attempt.retried().with_bearer(&token);
        let response = self.dispatch(&retry).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            // Second rejection after a fresh token: give up instead of
            // looping through the coordinator again.
            warn!(path = %request.path(), "Request rejected again after refresh; forcing logout");
            self.store.clear();
            self.events.emit(SessionEvent::LoggedOut {
                reason: "access token rejected after refresh".into(),
            });
            return Err(Error::SessionExpired(
                "access token rejected after refresh".into(),
            ));
        }

        // The retried result is returned as-is, success or failure.
        Self::into_classified(response).await
    }

    /// Execute and decode a JSON response body.
    pub async fn execute_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let response = self.execute(request).await?;
        Ok(response.json().await?)
    }

    /// Execute a call whose response body is irrelevant.
    pub async fn execute_unit(&self, request: ApiRequest) -> Result<()> {
        self.execute(request).await.map(|_| ())
    }

    /// Send one attempt: resolve the endpoint (locale read here, per call),
    /// attach the bearer, rebuild the body.
    async fn dispatch(&self, attempt: &RequestAttempt<'_>) -> Result<reqwest::Response> {
        let request = attempt.request();
        let url = match request.host() {
            Host::Api => self.config.api_endpoint(request.path())?,
            Host::Upload => self.config.upload_endpoint(request.path())?,
        };

        let mut builder = self.http.request(request.method().clone(), url);

        if !request.query_params().is_empty() {
            builder = builder.query(request.query_params());
        }

        let bearer = match attempt.bearer() {
            Some(token) => Some(token.to_string()),
            None => self.store.get().access_token,
        };
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }

        builder = request.apply_body(builder)?;

        debug!(
            method = %request.method(),
            path = %request.path(),
            retry = attempt.retry_count(),
            "Dispatching request"
        );
        Ok(builder.send().await?)
    }

    /// Pass successes through; turn everything else into a classified error
    /// carrying the backend's message when one is readable.
    async fn into_classified(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = read_error_message(response).await;
        debug!(status = %status, message = %message, "Request failed");
        Err(Error::from_status(status, message))
    }
}

/// TLS configuration with an explicit crypto provider and the platform's
/// certificate verifier; reqwest's no-provider feature set requires one to be
/// supplied at build time.
fn build_tls_config() -> Result<rustls::ClientConfig> {
    let provider = Arc::new(ring::default_provider());
    let tls = rustls::ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| Error::config(format!("TLS protocol configuration failed: {}", e)))?
        .with_platform_verifier()
        .with_no_client_auth();
    Ok(tls)
}

/// Extract the backend's error message, falling back to raw text.
async fn read_error_message(response: reqwest::Response) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: String,
    }

    let mut raw = match response.text().await {
        Ok(raw) => raw,
        Err(_) => return String::new(),
    };
    if raw.len() > ERROR_BODY_LIMIT {
        let mut end = ERROR_BODY_LIMIT;
        while !raw.is_char_boundary(end) {
            end -= 1;
        }
        raw.truncate(end);
    }

    match serde_json::from_str::<ErrorBody>(&raw) {
        Ok(body) => body.message,
        Err(_) => raw,
    }
}

/// Wire shape of the refresh endpoint's response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    access_token: String,
    /// Present only when the backend rotated the refresh token.
    refresh_token: Option<String>,
}

/// Raw refresh call, deliberately outside the interception chain.
///
/// The refresh credential travels in the cookie jar; the response carries
/// the new access token (and optionally a rotated refresh token).
struct HttpRefreshBackend {
    http: reqwest::Client,
    config: Arc<ClientConfig>,
}

#[async_trait]
impl RefreshBackend for HttpRefreshBackend {
    async fn refresh(&self) -> Result<RefreshedSession> {
        let url = self.config.api_endpoint("auth/refresh-token")?;
        let response = self
            .http
            .post(url)
            .json(&serde_json::json!({}))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = read_error_message(response).await;
            return Err(Error::from_status(status, message));
        }

        let body: RefreshResponse = response.json().await?;
        if body.access_token.is_empty() {
            return Err(Error::Api {
                status: status.as_u16(),
                message: "refresh response carried no usable token".into(),
            });
        }

        Ok(RefreshedSession {
            access_token: body.access_token,
            refresh_token: body.refresh_token,
        })
    }
}
