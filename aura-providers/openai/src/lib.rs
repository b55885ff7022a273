//! OpenAI-compatible chat completions provider implementing
//! [`aura_core::CompletionService`] with structured JSON-schema output.

mod config;
mod errors;
mod provider;
mod transport;
mod wire;

pub use config::OpenAiConfig;
pub use errors::OpenAiProviderError;
pub use provider::OpenAiProvider;
pub use transport::{ChatTransport, HttpReply, TransportError, UreqTransport};
