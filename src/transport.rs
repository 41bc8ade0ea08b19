use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, RETRY_AFTER};
use reqwest::{StatusCode, Url};
use url::form_urlencoded;

use crate::{ClientError, MethodId, TransportError};

/// Default Slack Web API endpoint.
pub const SLACK_API_BASE_URL: &str = "https://slack.com/api/";

/// Performs a single request/response exchange for one API call.
///
/// Implementations must not interpret the response body and must be safe for
/// concurrent use by overlapping calls.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Sends already-encoded form fields to `method` and returns the raw body.
    async fn send(
        &self,
        method: &MethodId,
        params: &[(String, String)],
    ) -> Result<Vec<u8>, TransportError>;
}

/// HTTP transport posting form-encoded calls to the Web API.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    base_url: Url,
    token: Option<String>,
    user_agent: Option<String>,
    timeout: Option<Duration>,
    http: reqwest::Client,
}

impl HttpTransport {
    /// Creates a transport rooted at the given base URL.
    ///
    /// The URL is normalized to include a trailing slash, so method
    /// identifiers join correctly.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self, ClientError> {
        let parsed = Url::parse(base_url.as_ref())
            .map_err(|_| ClientError::InvalidBaseUrl(base_url.as_ref().to_owned()))?;

        Ok(Self {
            base_url: ensure_trailing_slash(parsed),
            token: None,
            user_agent: None,
            timeout: None,
            http: reqwest::Client::new(),
        })
    }

    /// Creates a transport targeting [`SLACK_API_BASE_URL`].
    pub fn slack_default() -> Result<Self, ClientError> {
        Self::new(SLACK_API_BASE_URL)
    }

    /// Returns a transport that sends `Authorization: Bearer <token>`.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Returns a transport that sends the given `User-Agent` header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Returns a transport that fails requests exceeding `timeout`.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends the method as one percent-encoded segment under the base path.
    fn build_url(&self, method: &MethodId) -> Result<Url, TransportError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| TransportError::InvalidPath(method.as_str().to_owned()))?
            .pop_if_empty()
            .push(method.as_str());
        Ok(url)
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        method: &MethodId,
        params: &[(String, String)],
    ) -> Result<Vec<u8>, TransportError> {
        let url = self.build_url(method)?;
        let body = encode_form(params);

        let mut request = self
            .http
            .post(url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body);

        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        if let Some(user_agent) = &self.user_agent {
            request = request.header(reqwest::header::USER_AGENT, user_agent);
        }

        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.trim().parse().ok());
            return Err(TransportError::RateLimited { retry_after_secs });
        }

        let payload = response.bytes().await?;

        if !status.is_success() {
            return Err(TransportError::HttpStatus {
                status,
                body: String::from_utf8_lossy(&payload).into_owned(),
            });
        }

        Ok(payload.to_vec())
    }
}

fn encode_form(params: &[(String, String)]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params.iter().map(|(key, value)| (key.as_str(), value.as_str())))
        .finish()
}

fn ensure_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let mut path = url.path().to_owned();
        path.push('/');
        url.set_path(&path);
    }
    url
}
