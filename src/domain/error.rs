//! Error types for mock negotiation and example synthesis

use thiserror::Error;

/// Reasons a single mock call can fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MockError {
    /// The operation declares no responses at all
    #[error("Operation '{operation}' does not define any response")]
    NoResponseDefined { operation: String },

    /// A specific example was requested but is not declared
    #[error("Response example '{key}' is not defined")]
    ExampleKeyNotFound { key: String },

    /// A specific status code was requested but is not declared
    #[error("Operation '{operation}' does not define a '{code}' response")]
    StatusCodeNotFound { operation: String, code: String },

    /// The schema cannot be turned into a value (circular references)
    #[error("Unable to synthesize an example: {0}")]
    SynthesisFailure(String),
}

impl MockError {
    /// HTTP status the transport should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::ExampleKeyNotFound { .. } | Self::StatusCodeNotFound { .. } => 404,
            Self::NoResponseDefined { .. } | Self::SynthesisFailure(_) => 500,
        }
    }

    /// Short problem title for `application/problem+json` bodies.
    pub fn title(&self) -> &'static str {
        match self {
            Self::NoResponseDefined { .. } => "No response defined",
            Self::ExampleKeyNotFound { .. } => "Example not found",
            Self::StatusCodeNotFound { .. } => "Response code not found",
            Self::SynthesisFailure(_) => "Example synthesis failed",
        }
    }
}
