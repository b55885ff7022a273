//! [`CompletionService`] implementation over the chat completions API.

use std::thread;

use aura_core::{CompletionService, GenerationRequest, GenerationResponse, ServiceError};
use tracing::{Span, debug, instrument, warn};

use crate::{
    config::OpenAiConfig,
    errors::OpenAiProviderError,
    transport::{ChatTransport, HttpReply, TransportError, UreqTransport},
    wire::{ChatRequest, extract_content},
};

/// Structured-output completion service backed by OpenAI.
///
/// # Examples
/// ```
/// use aura_core::CompletionService;
/// use aura_providers_openai::{OpenAiConfig, OpenAiProvider};
///
/// let provider = OpenAiProvider::new(OpenAiConfig::new("sk-test"));
/// assert_eq!(provider.name(), "openai");
/// ```
#[derive(Debug)]
pub struct OpenAiProvider<T = UreqTransport> {
    config: OpenAiConfig,
    transport: T,
}

impl OpenAiProvider<UreqTransport> {
    /// Creates a provider using a `ureq` transport.
    #[must_use]
    pub fn new(config: OpenAiConfig) -> Self {
        let transport = UreqTransport::new(config.timeout());
        Self { config, transport }
    }

    /// Creates a provider configured from the environment.
    ///
    /// # Errors
    /// Returns [`OpenAiProviderError`] when the configuration is incomplete.
    pub fn from_env() -> Result<Self, OpenAiProviderError> {
        OpenAiConfig::from_env().map(Self::new)
    }
}

impl<T: ChatTransport> OpenAiProvider<T> {
    /// Creates a provider using a caller-supplied transport.
    #[must_use]
    pub const fn with_transport(config: OpenAiConfig, transport: T) -> Self {
        Self { config, transport }
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    fn send_with_retry(&self, url: &str, body: &str) -> Result<HttpReply, ServiceError> {
        let max_attempts = self.config.max_attempts().get();
        let mut attempt = 1;
        loop {
            Span::current().record("attempts", attempt);
            let outcome = self.transport.post_json(url, self.config.api_key(), body);
            let retryable = match &outcome {
                Ok(reply) => reply.is_transient(),
                Err(TransportError { retryable, .. }) => *retryable,
            };
            if !retryable || attempt >= max_attempts {
                return outcome.map_err(|err| ServiceError::upstream(err.message));
            }

            let delay = self.config.retry_backoff(attempt);
            let delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
            match &outcome {
                Ok(reply) => warn!(
                    attempt,
                    status = reply.status,
                    delay_ms,
                    "transient status; retrying"
                ),
                Err(err) => warn!(
                    attempt,
                    error = %err.message,
                    delay_ms,
                    "transport failure; retrying"
                ),
            }
            thread::sleep(delay);
            attempt += 1;
        }
    }
}

impl<T: ChatTransport> CompletionService for OpenAiProvider<T> {
    fn name(&self) -> &str {
        "openai"
    }

    #[instrument(
        name = "openai.complete",
        err,
        skip(self, request),
        fields(model = request.model, schema = request.schema.name, attempts = tracing::field::Empty),
    )]
    fn complete(
        &self,
        request: &GenerationRequest<'_>,
    ) -> Result<GenerationResponse, ServiceError> {
        let body = serde_json::to_string(&ChatRequest::from_generation(request))
            .map_err(|err| ServiceError::upstream(format!("failed to encode request: {err}")))?;
        let reply = self.send_with_retry(&self.config.endpoint(), &body)?;
        if !reply.is_success() {
            return Err(ServiceError::upstream(format!(
                "HTTP {}: {}",
                reply.status,
                reply.body.trim()
            )));
        }
        debug!(bytes = reply.body.len(), "received completion");

        let content = extract_content(&reply.body, request.schema)?;
        request.schema.parse(&content)
    }
}
