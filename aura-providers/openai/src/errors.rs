use std::env::VarError;

use thiserror::Error;

/// Errors raised while configuring the OpenAI provider.
#[derive(Debug, Error)]
pub enum OpenAiProviderError {
    /// No API key was supplied, or it was blank.
    #[error("missing API key; set `{name}`")]
    MissingApiKey {
        /// Environment variable expected to hold the key.
        name: &'static str,
    },
    /// An environment variable contained invalid UTF-8 data.
    #[error("environment variable `{name}` contained invalid UTF-8: {source}")]
    InvalidUnicode {
        /// Name of the offending environment variable.
        name: &'static str,
        /// Underlying lookup failure.
        #[source]
        source: VarError,
    },
    /// A numeric setting could not be parsed or was out of range.
    #[error("invalid value `{value}` for `{name}`: {reason}")]
    InvalidSetting {
        /// Name of the setting.
        name: &'static str,
        /// Raw value supplied.
        value: String,
        /// Why it was rejected.
        reason: &'static str,
    },
}
