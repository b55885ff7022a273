//! HTTP transport abstraction so the provider can be exercised without a
//! network.

use std::time::Duration;

use ureq::Agent;

/// Status and body of an HTTP reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    /// HTTP status code.
    pub status: u16,
    /// Response body decoded as UTF-8.
    pub body: String,
}

impl HttpReply {
    /// Returns whether the status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Returns whether the status signals a transient condition: rate
    /// limiting or a server-side error.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        self.status == 429 || self.status >= 500
    }
}

/// Failure to obtain any HTTP reply at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    /// Human-readable failure description.
    pub message: String,
    /// Whether the request may succeed if sent again (timeouts, refused
    /// connections, dropped sockets).
    pub retryable: bool,
}

impl From<ureq::Error> for TransportError {
    fn from(error: ureq::Error) -> Self {
        let retryable = matches!(
            error,
            ureq::Error::Timeout(_)
                | ureq::Error::ConnectionFailed
                | ureq::Error::HostNotFound
                | ureq::Error::Io(_)
        );
        Self {
            message: error.to_string(),
            retryable,
        }
    }
}

/// Sends one JSON POST and returns the raw reply.
pub trait ChatTransport {
    /// Posts `body` to `url` with bearer authentication.
    ///
    /// Non-2xx statuses are returned as an [`HttpReply`], not an error.
    ///
    /// # Errors
    /// Returns [`TransportError`] when no reply could be obtained.
    fn post_json(&self, url: &str, api_key: &str, body: &str) -> Result<HttpReply, TransportError>;
}

impl<T: ChatTransport + ?Sized> ChatTransport for &T {
    fn post_json(&self, url: &str, api_key: &str, body: &str) -> Result<HttpReply, TransportError> {
        (**self).post_json(url, api_key, body)
    }
}

/// Blocking [`ChatTransport`] backed by a `ureq` agent.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    /// Builds an agent that reports every status as a reply and applies
    /// `timeout` to the whole request when set.
    #[must_use]
    pub fn new(timeout: Option<Duration>) -> Self {
        let config = Agent::config_builder()
            .timeout_global(timeout)
            .http_status_as_error(false)
            .build();
        Self {
            agent: config.into(),
        }
    }
}

impl ChatTransport for UreqTransport {
    fn post_json(&self, url: &str, api_key: &str, body: &str) -> Result<HttpReply, TransportError> {
        let mut response = self
            .agent
            .post(url)
            .header("Authorization", format!("Bearer {}", api_key.trim()))
            .header("Content-Type", "application/json")
            .send(body)?;
        let status = response.status().as_u16();
        let body = response.body_mut().read_to_string()?;
        Ok(HttpReply { status, body })
    }
}
