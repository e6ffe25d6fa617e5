//! Error types for the callback flow.
//!
//! Every collaborator failure is caught where the call is made and turned
//! into one of these types before it can reach the phase. [`FailureKind`]
//! is the user-facing taxonomy the phase carries.

use crate::constants::messages;
use thiserror::Error;

// ═══════════════════════════════════════════════════════════
// Failure Taxonomy
// ═══════════════════════════════════════════════════════════

/// Failure categories shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The link's code or token was already consumed or is past its window.
    Expired,

    /// The link is missing parameters or the backend rejected it.
    Invalid,

    /// A session was expected at commit time but could not be read.
    SessionLost,

    /// Password too short or confirmation mismatch.
    Validation,

    /// The finalization API returned a non-2xx response.
    CommitRejected,

    /// Nothing resolved the flow before the deadline.
    Timeout,
}

impl FailureKind {
    /// Copy shown when no more specific message is available.
    #[must_use]
    pub const fn default_message(self) -> &'static str {
        match self {
            Self::Expired => messages::EXPIRED_LINK,
            Self::Invalid => messages::INVALID_LINK,
            Self::SessionLost => messages::SESSION_LOST,
            Self::Validation => messages::INVALID_PASSWORD,
            Self::CommitRejected => messages::COMMIT_FAILED,
            Self::Timeout => messages::TIMED_OUT,
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Identity Backend
// ═══════════════════════════════════════════════════════════

/// Error reported by the identity backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct IdentityError {
    /// HTTP status, when the backend reported one.
    pub status: Option<u16>,
    /// Human-readable message from the backend.
    pub message: String,
}

impl IdentityError {
    /// Create an error without a status.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    /// Attach an HTTP status.
    #[must_use]
    pub const fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

// ═══════════════════════════════════════════════════════════
// Password Commit
// ═══════════════════════════════════════════════════════════

/// Local password validation failure.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// Password shorter than the configured minimum.
    #[error("Password must be at least {min} characters long")]
    TooShort {
        /// Minimum length in characters
        min: usize,
    },

    /// Password and confirmation differ.
    #[error("Passwords do not match")]
    Mismatch,
}

/// Failure of the password commit step.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommitError {
    /// Rejected locally before any network call.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No session could be read at commit time.
    #[error("No session available at commit time")]
    SessionLost,

    /// The finalization API answered with a non-2xx status.
    #[error("Finalization rejected ({status}): {message}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Message from the `error` or `message` field of the body
        message: String,
    },

    /// The request never produced a response.
    #[error("Finalization request failed: {0}")]
    Transport(String),
}

impl CommitError {
    /// Taxonomy entry for this failure.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::Validation(_) => FailureKind::Validation,
            Self::SessionLost => FailureKind::SessionLost,
            Self::Rejected { .. } | Self::Transport(_) => FailureKind::CommitRejected,
        }
    }

    /// Message shown next to the password form.
    ///
    /// Server messages are surfaced verbatim.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(error) => error.to_string(),
            Self::SessionLost => messages::SESSION_LOST.to_string(),
            Self::Rejected { message, .. } if !message.trim().is_empty() => message.clone(),
            Self::Rejected { .. } | Self::Transport(_) => messages::COMMIT_FAILED.to_string(),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Link, Providers, Configuration
// ═══════════════════════════════════════════════════════════

/// The incoming callback URL could not be read.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LinkError {
    /// No URL at all.
    #[error("Callback URL is empty")]
    Empty,
}

/// Failure of an auxiliary collaborator (profile directory, policy source).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Provider unavailable: {0}")]
pub struct ProviderError(pub String);

/// Invalid or missing configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Required variable not set.
    #[error("Missing configuration value: {0}")]
    Missing(&'static str),

    /// Variable set to a value that cannot be parsed.
    #[error("Invalid value for {key}: {value}")]
    Invalid {
        /// Variable name
        key: &'static str,
        /// Rejected value
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_surfaces_server_message() {
        let error = CommitError::Rejected {
            status: 400,
            message: "Password is too weak".to_string(),
        };

        assert_eq!(error.user_message(), "Password is too weak");
        assert_eq!(error.kind(), FailureKind::CommitRejected);
    }

    #[test]
    fn test_blank_rejection_falls_back_to_generic_copy() {
        let error = CommitError::Rejected {
            status: 500,
            message: "  ".to_string(),
        };

        assert_eq!(error.user_message(), messages::COMMIT_FAILED);
    }

    #[test]
    fn test_validation_converts_into_commit_error() {
        let error: CommitError = ValidationError::TooShort { min: 8 }.into();

        assert_eq!(error.kind(), FailureKind::Validation);
        assert!(error.user_message().contains('8'));
    }

    #[test]
    fn test_identity_error_displays_message() {
        let error = IdentityError::new("Token has expired").with_status(403);

        assert_eq!(error.status, Some(403));
        assert_eq!(error.to_string(), "Token has expired");
    }
}
