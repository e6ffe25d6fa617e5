//! Callback flow state.
//!
//! One [`CallbackState`] is created per mount and discarded on unmount. The
//! reducer is its only writer; every transition goes through
//! [`CallbackState::transition`], which enforces the phase invariants.

use crate::error::FailureKind;
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════
// Phase
// ═══════════════════════════════════════════════════════════

/// Where the callback flow currently is.
///
/// `Loading` is the initial phase and is never re-entered. `Success`,
/// `Expired`, `Error` and `Cancelled` are terminal. `SetPassword` only moves
/// to `Success` or `Cancelled`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    /// Waiting for any signal to resolve the link.
    #[default]
    Loading,

    /// A session exists; the user must choose a password.
    SetPassword,

    /// Password committed and hand-off scheduled.
    Success,

    /// The link was already used or is past its validity window.
    Expired,

    /// Any other failure.
    Error {
        /// Taxonomy entry
        reason: FailureKind,
        /// User-facing message
        message: String,
    },

    /// The user abandoned the password step.
    Cancelled,
}

impl Phase {
    /// Build an error phase.
    #[must_use]
    pub fn error(reason: FailureKind, message: impl Into<String>) -> Self {
        Self::Error {
            reason,
            message: message.into(),
        }
    }

    /// Returns `true` for phases that never change again.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Success | Self::Expired | Self::Error { .. } | Self::Cancelled
        )
    }

    /// Short name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::SetPassword => "set-password",
            Self::Success => "success",
            Self::Expired => "expired",
            Self::Error { .. } => "error",
            Self::Cancelled => "cancelled",
        }
    }

    /// Message to display for failure phases.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Expired => Some(FailureKind::Expired.default_message()),
            Self::Error { message, .. } => Some(message.as_str()),
            _ => None,
        }
    }

    fn allows(&self, next: &Self) -> bool {
        match (self, next) {
            (_, Self::Loading) => false,
            (current, _) if current.is_terminal() => false,
            (Self::SetPassword, next) => matches!(next, Self::Success | Self::Cancelled),
            (Self::Loading, next) => {
                matches!(next, Self::SetPassword | Self::Expired | Self::Error { .. })
            },
            _ => false,
        }
    }
}

/// Whether the link was an invitation or a password recovery.
///
/// Affects messaging only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowLabel {
    /// Invitation link.
    #[default]
    Invite,
    /// Password-recovery link.
    Recovery,
}

/// Flag that trips exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OnceGuard(bool);

impl OnceGuard {
    /// Trip the guard. Returns `true` only for the call that tripped it.
    pub const fn trip(&mut self) -> bool {
        if self.0 {
            false
        } else {
            self.0 = true;
            true
        }
    }

    /// Whether the guard has tripped.
    #[must_use]
    pub const fn is_tripped(self) -> bool {
        self.0
    }
}

/// Entry strategy chosen when the link was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    /// `?code=` present: exchange it.
    CodeExchange,
    /// `#error=` present: report it.
    ErrorFragment,
    /// Neither: read an already-established session.
    SessionPoll,
}

/// Which signal resolved the flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    /// The code exchange returned a session.
    CodeExchange,
    /// The backend announced an established session.
    SessionEvent,
    /// The backend announced password-recovery mode.
    RecoveryMode,
    /// The fallback session read found a session.
    SessionPoll,
}

// ═══════════════════════════════════════════════════════════
// Session
// ═══════════════════════════════════════════════════════════

/// Role stored in user metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Platform operator.
    SuperAdmin,
    /// Administrator of one tenant.
    TenantAdmin,
    /// Regular member of a tenant.
    #[default]
    Employee,
}

/// Metadata the identity backend stores on the user.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserMetadata {
    /// Display name.
    pub full_name: Option<String>,
    /// Role, if assigned.
    pub role: Option<Role>,
    /// Tenant the user belongs to.
    pub tenant_id: Option<String>,
}

/// Subject of a session.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionUser {
    /// Subject id.
    pub id: String,
    /// Email address.
    pub email: Option<String>,
    /// Backend-side metadata.
    pub metadata: UserMetadata,
}

/// Session issued by the identity backend.
///
/// Opaque to the flow apart from the subject and the bearer token.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token for authenticated calls.
    pub access_token: String,
    /// Session subject.
    pub user: SessionUser,
}

impl Session {
    /// Create a session for `user_id`.
    #[must_use]
    pub fn new(access_token: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            user: SessionUser {
                id: user_id.into(),
                ..SessionUser::default()
            },
        }
    }

    /// Set the subject's email.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.user.email = Some(email.into());
        self
    }

    /// Set the subject's metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: UserMetadata) -> Self {
        self.user.metadata = metadata;
        self
    }

    /// A session is usable only with both a token and a subject.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.access_token.is_empty() && !self.user.id.is_empty()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .field("user", &self.user)
            .finish()
    }
}

/// Password entered by the user. Never printed.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Password(String);

impl Password {
    /// Wrap a password.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The password text.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Length in characters.
    #[must_use]
    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

// ═══════════════════════════════════════════════════════════
// Hand-off
// ═══════════════════════════════════════════════════════════

/// Profile handed to the host application on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Subject id.
    pub id: String,
    /// Email address (empty when unknown).
    pub email: String,
    /// Display name.
    pub full_name: Option<String>,
    /// Role driving the landing route.
    pub role: Role,
    /// Tenant, if any.
    pub tenant_id: Option<String>,
}

/// Everything the host receives when the flow completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handoff {
    /// Fully populated profile.
    pub profile: UserProfile,
    /// Route to navigate to.
    pub route: String,
}

// ═══════════════════════════════════════════════════════════
// Callback State
// ═══════════════════════════════════════════════════════════

/// State owned by the callback reducer.
#[derive(Debug, Clone, Default)]
pub struct CallbackState {
    /// Current phase.
    pub phase: Phase,
    /// Invite or recovery.
    pub flow_label: FlowLabel,
    /// Trips on the first resolution.
    pub resolution: OnceGuard,
    /// Trips on the completion hand-off or user abort.
    pub navigation: OnceGuard,
    /// Session obtained during resolution; dropped on terminal phases.
    pub pending_session: Option<Session>,
    /// Local error shown next to the password form.
    pub form_error: Option<String>,
    /// A password commit is in flight.
    pub submitting: bool,
    /// Set once the link has been classified.
    pub branch: Option<Branch>,
    /// Signal that resolved the flow.
    pub resolved_by: Option<ResolutionSource>,
    /// Hand-off once prepared.
    pub handoff: Option<Handoff>,
    /// URL left visible after stripping credentials.
    pub visible_url: Option<String>,
    /// `Mounted` has been processed.
    pub mounted: bool,
}

impl CallbackState {
    /// Move to `next` if the phase invariants allow it.
    ///
    /// Returns `false` (and leaves the state untouched) otherwise. Entering a
    /// terminal phase drops the pending session and any in-flight flag.
    pub fn transition(&mut self, next: Phase) -> bool {
        if !self.phase.allows(&next) {
            tracing::debug!(
                from = self.phase.name(),
                to = next.name(),
                "Ignoring disallowed phase transition"
            );
            return false;
        }

        tracing::debug!(from = self.phase.name(), to = next.name(), "Phase transition");
        self.phase = next;
        if self.phase.is_terminal() {
            self.pending_session = None;
            self.submitting = false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loading_is_never_reentered() {
        let mut state = CallbackState::default();
        assert!(state.transition(Phase::SetPassword));
        assert!(!state.transition(Phase::Loading));
        assert_eq!(state.phase, Phase::SetPassword);
    }

    #[test]
    fn test_terminal_phases_stay_terminal() {
        for terminal in [
            Phase::Success,
            Phase::Expired,
            Phase::error(FailureKind::Timeout, "late"),
            Phase::Cancelled,
        ] {
            let mut state = CallbackState {
                phase: terminal.clone(),
                ..CallbackState::default()
            };
            assert!(!state.transition(Phase::SetPassword));
            assert!(!state.transition(Phase::Success));
            assert_eq!(state.phase, terminal);
        }
    }

    #[test]
    fn test_set_password_only_moves_to_success_or_cancelled() {
        let mut state = CallbackState {
            phase: Phase::SetPassword,
            ..CallbackState::default()
        };
        assert!(!state.transition(Phase::Expired));
        assert!(!state.transition(Phase::error(FailureKind::Timeout, "x")));
        assert!(state.transition(Phase::Cancelled));
    }

    #[test]
    fn test_loading_cannot_skip_set_password() {
        let mut state = CallbackState::default();
        assert!(!state.transition(Phase::Success));
        assert!(!state.transition(Phase::Cancelled));
        assert_eq!(state.phase, Phase::Loading);

        assert!(state.transition(Phase::Expired));
    }

    #[test]
    fn test_loading_may_fail_with_error() {
        let mut state = CallbackState::default();
        assert!(state.transition(Phase::error(FailureKind::Timeout, "late")));
    }

    #[test]
    fn test_terminal_phase_drops_pending_session() {
        let mut state = CallbackState {
            phase: Phase::SetPassword,
            pending_session: Some(Session::new("token", "user-1")),
            submitting: true,
            ..CallbackState::default()
        };

        assert!(state.transition(Phase::Success));
        assert!(state.pending_session.is_none());
        assert!(!state.submitting);
    }

    #[test]
    fn test_once_guard_trips_once() {
        let mut guard = OnceGuard::default();
        assert!(guard.trip());
        assert!(!guard.trip());
        assert!(guard.is_tripped());
    }

    #[test]
    fn test_expired_phase_shows_expired_copy() {
        assert_eq!(
            Phase::Expired.message(),
            Some(crate::constants::messages::EXPIRED_LINK)
        );
        assert_eq!(Phase::Loading.message(), None);
    }

    #[test]
    fn test_secrets_are_redacted_in_debug() {
        let session = Session::new("secret-token", "user-1");
        let password = Password::new("hunter22");

        assert!(!format!("{session:?}").contains("secret-token"));
        assert!(!format!("{password:?}").contains("hunter22"));
        assert_eq!(password.char_count(), 8);
    }

    #[test]
    fn test_session_validity() {
        assert!(Session::new("t", "u").is_valid());
        assert!(!Session::new("", "u").is_valid());
        assert!(!Session::new("t", "").is_valid());
    }
}
