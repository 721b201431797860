//! Error types for remote AI operations.

use std::fmt;

use thiserror::Error;

/// Errors that can occur while talking to a detection or assist collaborator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AiError {
    /// Credentials are missing. Blocks AI actions but never manual annotation.
    #[error("AI is not configured: {message}")]
    Configuration { message: String },

    /// Quota or rate limit hit. The same request may succeed later.
    #[error("Temporary AI failure: {message}")]
    Transient { message: String },

    /// Any other remote failure (network, auth rejected, server error)
    #[error("AI request failed: {message}")]
    Remote { message: String },

    /// The response could not be parsed or did not match the expected shape
    #[error("Malformed AI response: {message}")]
    MalformedResponse { message: String },

    /// Detection results do not line up with the submitted images
    #[error("Detection returned {found} results for {expected} images")]
    CountMismatch { expected: usize, found: usize },

    /// Rejected before any remote call (empty prompt, no images)
    #[error("Invalid request: {message}")]
    InvalidInput { message: String },
}

impl AiError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self::Transient {
            message: message.into(),
        }
    }

    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote {
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Whether retrying the same request can reasonably succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }

    /// Whether the remote answered with something unusable.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Self::MalformedResponse { .. } | Self::CountMismatch { .. }
        )
    }
}

/// API credential handed to collaborators. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(****)")
    }
}
