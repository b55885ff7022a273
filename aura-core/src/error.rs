//! Error types for the AURA core library.
//!
//! Defines the error enums exposed by the public API, their stable
//! machine-readable codes, and a convenient result alias.

use std::{fmt, io, path::PathBuf};

use thiserror::Error;

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            #[must_use]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// An error produced by a [`crate::CompletionService`] for a single request.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ServiceError {
    /// The service could not be reached, rejected the credentials, or answered
    /// with an error status.
    #[error("upstream service failed: {message}")]
    Upstream {
        /// Human-readable failure description.
        message: String,
    },
    /// The service answered, but the payload does not match the declared
    /// response schema.
    #[error("response does not conform to schema `{schema}`: {reason}")]
    SchemaValidation {
        /// Name of the schema the response was checked against.
        schema: String,
        /// What was wrong with the payload.
        reason: String,
    },
}

define_error_codes! {
    /// Stable codes describing [`ServiceError`] variants.
    enum ServiceErrorCode for ServiceError {
        /// Network, authentication, or service-side failure.
        Upstream => Upstream { .. } => "SERVICE_UPSTREAM",
        /// The response did not conform to the declared schema.
        SchemaValidation => SchemaValidation { .. } => "SERVICE_SCHEMA_VALIDATION",
    }
}

impl ServiceError {
    /// Convenience constructor for [`ServiceError::Upstream`].
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
        }
    }
}

/// Error type produced when configuring or running an [`crate::Augmenter`].
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AuraError {
    /// A configuration value was rejected before the run started.
    #[error("invalid configuration for `{setting}`: {reason}")]
    InvalidConfiguration {
        /// Name of the offending setting.
        setting: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
    /// The input artifact could not be read.
    #[error("failed to read input `{path}`: {source}")]
    ReadInput {
        /// Path of the input artifact.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// The output artifact could not be written.
    #[error("failed to write output `{path}`: {source}")]
    WriteOutput {
        /// Path of the output artifact.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// The completion service failed while processing a chunk. Chunks before
    /// `chunk` remain committed to the output artifact.
    #[error("chunk {chunk} failed: {error}")]
    Service {
        /// 1-based index of the chunk that failed.
        chunk: usize,
        /// Underlying service error.
        #[source]
        error: ServiceError,
    },
}

define_error_codes! {
    /// Stable codes describing [`AuraError`] variants.
    enum AuraErrorCode for AuraError {
        /// A configuration value was rejected before the run started.
        InvalidConfiguration => InvalidConfiguration { .. } => "AURA_INVALID_CONFIGURATION",
        /// The input artifact could not be read.
        ReadInput => ReadInput { .. } => "AURA_READ_INPUT",
        /// The output artifact could not be written.
        WriteOutput => WriteOutput { .. } => "AURA_WRITE_OUTPUT",
        /// The completion service failed while processing a chunk.
        ServiceFailure => Service { .. } => "AURA_SERVICE_FAILURE",
    }
}

impl AuraError {
    /// Retrieve the inner [`ServiceErrorCode`] when the error originated in a
    /// [`crate::CompletionService`].
    #[must_use]
    pub const fn service_code(&self) -> Option<ServiceErrorCode> {
        match self {
            Self::Service { error, .. } => Some(error.code()),
            _ => None,
        }
    }

    pub(crate) fn invalid(setting: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            setting,
            reason: reason.into(),
        }
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, AuraError>;
