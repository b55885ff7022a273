//! Provider configuration, usually sourced from the environment.

use std::{env, env::VarError, fmt, num::NonZeroUsize, time::Duration};

use crate::errors::OpenAiProviderError;

const API_KEY_ENV: &str = "OPENAI_API_KEY";
const BASE_URL_ENV: &str = "OPENAI_BASE_URL";
const MAX_ATTEMPTS_ENV: &str = "AURA_MAX_ATTEMPTS";
const TIMEOUT_ENV: &str = "AURA_REQUEST_TIMEOUT_SECS";

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

/// Connection and retry settings for [`crate::OpenAiProvider`].
///
/// By default each request is attempted once and no timeout is imposed
/// beyond the HTTP client's own.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use aura_providers_openai::OpenAiConfig;
///
/// let config = OpenAiConfig::new("sk-test")
///     .with_base_url("http://localhost:8080/v1/")
///     .with_max_attempts(3)
///     .with_timeout(Duration::from_secs(30));
/// assert_eq!(config.endpoint(), "http://localhost:8080/v1/chat/completions");
/// assert_eq!(config.max_attempts().get(), 3);
/// ```
#[derive(Clone)]
pub struct OpenAiConfig {
    api_key: String,
    base_url: String,
    timeout: Option<Duration>,
    max_attempts: NonZeroUsize,
    retry_base_delay: Duration,
}

impl fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("max_attempts", &self.max_attempts)
            .field("retry_base_delay", &self.retry_base_delay)
            .finish()
    }
}

impl OpenAiConfig {
    /// Creates a configuration for the public OpenAI endpoint.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: None,
            max_attempts: NonZeroUsize::MIN,
            retry_base_delay: DEFAULT_RETRY_BASE_DELAY,
        }
    }

    /// Reads `OPENAI_API_KEY` (required), `OPENAI_BASE_URL`,
    /// `AURA_MAX_ATTEMPTS`, and `AURA_REQUEST_TIMEOUT_SECS`.
    ///
    /// # Errors
    /// Returns [`OpenAiProviderError`] when the key is missing or blank, a
    /// variable is not valid UTF-8, or a numeric value does not parse.
    pub fn from_env() -> Result<Self, OpenAiProviderError> {
        Self::from_lookup(|name| env::var(name))
    }

    /// Like [`Self::from_env`], resolving variables through `lookup`.
    ///
    /// # Errors
    /// See [`Self::from_env`].
    ///
    /// # Examples
    /// ```
    /// use std::env::VarError;
    /// use aura_providers_openai::OpenAiConfig;
    ///
    /// let config = OpenAiConfig::from_lookup(|name| match name {
    ///     "OPENAI_API_KEY" => Ok("sk-test".to_owned()),
    ///     _ => Err(VarError::NotPresent),
    /// })?;
    /// assert_eq!(config.endpoint(), "https://api.openai.com/v1/chat/completions");
    /// # Ok::<(), aura_providers_openai::OpenAiProviderError>(())
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Result<Self, OpenAiProviderError>
    where
        F: Fn(&str) -> Result<String, VarError>,
    {
        let read = |name: &'static str| match lookup(name) {
            Ok(value) if value.trim().is_empty() => Ok(None),
            Ok(value) => Ok(Some(value.trim().to_owned())),
            Err(VarError::NotPresent) => Ok(None),
            Err(source) => Err(OpenAiProviderError::InvalidUnicode { name, source }),
        };

        let api_key = read(API_KEY_ENV)?
            .ok_or(OpenAiProviderError::MissingApiKey { name: API_KEY_ENV })?;
        let mut config = Self::new(api_key);
        if let Some(base_url) = read(BASE_URL_ENV)? {
            config = config.with_base_url(base_url);
        }
        if let Some(raw) = read(MAX_ATTEMPTS_ENV)? {
            config = config.with_max_attempts(parse_positive(MAX_ATTEMPTS_ENV, &raw)?);
        }
        if let Some(raw) = read(TIMEOUT_ENV)? {
            let secs = parse_positive(TIMEOUT_ENV, &raw)?;
            config = config.with_timeout(Duration::from_secs(secs as u64));
        }
        Ok(config)
    }

    /// Overrides the API base URL (for proxies and compatible servers).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets an overall per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets how many times a request is attempted before giving up. Values
    /// below 1 are treated as 1.
    #[must_use]
    pub fn with_max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = NonZeroUsize::new(attempts).unwrap_or(NonZeroUsize::MIN);
        self
    }

    /// Sets the first retry delay; later retries double it.
    #[must_use]
    pub const fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    /// Returns the full chat completions URL.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    /// Returns the configured timeout, if any.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Returns the maximum number of attempts per request.
    #[must_use]
    pub const fn max_attempts(&self) -> NonZeroUsize {
        self.max_attempts
    }

    pub(crate) fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Delay before retry number `attempt` (1-based), capped at 32x the base.
    pub(crate) fn retry_backoff(&self, attempt: usize) -> Duration {
        let capped = attempt.min(5) as u32;
        self.retry_base_delay.saturating_mul(1 << capped)
    }
}

fn parse_positive(name: &'static str, raw: &str) -> Result<usize, OpenAiProviderError> {
    match raw.parse::<usize>() {
        Ok(0) => Err(OpenAiProviderError::InvalidSetting {
            name,
            value: raw.to_owned(),
            reason: "must be at least 1",
        }),
        Ok(value) => Ok(value),
        Err(_) => Err(OpenAiProviderError::InvalidSetting {
            name,
            value: raw.to_owned(),
            reason: "expected a positive integer",
        }),
    }
}
