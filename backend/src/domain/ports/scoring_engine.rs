//! Driven port for the external scoring engine.
//!
//! The engine is an external collaborator reached over HTTP; this port keeps
//! the proxy logic testable without a network. One call, one attempt: the
//! caller never retries a failed scoring request.

use async_trait::async_trait;

use crate::domain::prediction::{FeatureVector, ScoringOutcome};

/// Failures raised by scoring engine adapters.
///
/// All variants surface to API callers as the same server error; the
/// distinction exists for logs and adapter tests.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScoringEngineError {
    /// The request did not complete within the configured timeout.
    #[error("scoring request timed out: {message}")]
    Timeout { message: String },
    /// The engine was unreachable or the connection failed mid-flight.
    #[error("scoring transport failed: {message}")]
    Transport { message: String },
    /// The engine answered with a non-success HTTP status.
    #[error("scoring engine rejected the request: {message}")]
    Status { message: String },
    /// The engine answered 2xx but the body was not a usable scoring result.
    #[error("scoring response could not be decoded: {message}")]
    Decode { message: String },
}

impl ScoringEngineError {
    /// Timeout constructor.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Transport failure constructor.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Non-success status constructor.
    pub fn status(message: impl Into<String>) -> Self {
        Self::Status {
            message: message.into(),
        }
    }

    /// Decode failure constructor.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

/// Driven port for obtaining a point estimate plus interval bounds.
#[async_trait]
pub trait ScoringEngine: Send + Sync {
    /// Score one feature vector. The payload is forwarded without
    /// interpretation; validation is the engine's concern.
    async fn score(&self, features: &FeatureVector) -> Result<ScoringOutcome, ScoringEngineError>;
}
