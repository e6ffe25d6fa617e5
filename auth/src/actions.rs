//! Callback flow actions.
//!
//! Every signal source feeds the reducer through one of these: the host
//! (mount, form input), effect completions (exchange, session read, commit,
//! profile build), identity-backend notifications and timers.

use crate::error::{CommitError, IdentityError};
use crate::state::{Handoff, Password, Session};

/// Input to the callback reducer.
#[derive(Debug, Clone, PartialEq)]
pub enum CallbackAction {
    // ═══════════════════════════════════════════════════════════
    // Host Commands
    // ═══════════════════════════════════════════════════════════

    /// The callback page mounted with `url`.
    Mounted {
        /// Full callback URL, query and fragment included
        url: String,
    },

    /// The user submitted the password form.
    SubmitPassword {
        /// New password
        password: Password,
        /// Confirmation field
        confirmation: Password,
    },

    /// The user abandoned the password step.
    AbortRequested,

    // ═══════════════════════════════════════════════════════════
    // Resolution Signals
    // ═══════════════════════════════════════════════════════════

    /// The one-time code was exchanged.
    CodeExchanged {
        /// Session issued for the code
        session: Session,
    },

    /// The one-time code could not be exchanged.
    CodeExchangeFailed {
        /// Backend error
        error: IdentityError,
    },

    /// The fallback session read completed.
    SessionPolled {
        /// Session, if one was already established
        session: Option<Session>,
    },

    /// The fallback session read failed.
    SessionPollFailed {
        /// Backend error
        error: IdentityError,
    },

    /// The backend announced an established session.
    SessionEstablished {
        /// Established session
        session: Session,
    },

    /// The backend announced password-recovery mode.
    RecoveryModeEntered {
        /// Session, when the notification carried one
        session: Option<Session>,
    },

    /// The backend announced updated user attributes.
    ProfileUpdated {
        /// Session of the updated user
        session: Session,
    },

    /// The resolution deadline passed.
    DeadlineElapsed,

    // ═══════════════════════════════════════════════════════════
    // Password Commit
    // ═══════════════════════════════════════════════════════════

    /// The finalization API accepted the password.
    PasswordCommitted {
        /// Session the password was committed for
        session: Session,
    },

    /// The password could not be committed.
    PasswordCommitFailed {
        /// Commit failure
        error: CommitError,
    },

    // ═══════════════════════════════════════════════════════════
    // Completion
    // ═══════════════════════════════════════════════════════════

    /// Profile and route are ready.
    HandoffReady {
        /// Prepared hand-off
        handoff: Handoff,
    },

    /// Hand the profile to the host and navigate.
    Navigate {
        /// Prepared hand-off
        handoff: Handoff,
    },
}

impl CallbackAction {
    /// Build a [`CallbackAction::SubmitPassword`] from form fields.
    #[must_use]
    pub fn submit(password: impl Into<String>, confirmation: impl Into<String>) -> Self {
        Self::SubmitPassword {
            password: Password::new(password),
            confirmation: Password::new(confirmation),
        }
    }

    /// Short name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Mounted { .. } => "mounted",
            Self::SubmitPassword { .. } => "submit_password",
            Self::AbortRequested => "abort_requested",
            Self::CodeExchanged { .. } => "code_exchanged",
            Self::CodeExchangeFailed { .. } => "code_exchange_failed",
            Self::SessionPolled { .. } => "session_polled",
            Self::SessionPollFailed { .. } => "session_poll_failed",
            Self::SessionEstablished { .. } => "session_established",
            Self::RecoveryModeEntered { .. } => "recovery_mode_entered",
            Self::ProfileUpdated { .. } => "profile_updated",
            Self::DeadlineElapsed => "deadline_elapsed",
            Self::PasswordCommitted { .. } => "password_committed",
            Self::PasswordCommitFailed { .. } => "password_commit_failed",
            Self::HandoffReady { .. } => "handoff_ready",
            Self::Navigate { .. } => "navigate",
        }
    }
}
