//! One-time code exchange.
//!
//! The code is exchanged once per mount. Failures are classified here,
//! before they reach the phase: anything that looks like a consumed or
//! timed-out link is `Expired`, everything else is an `Error` carrying the
//! backend's message.

use crate::actions::CallbackAction;
use crate::constants::{EXPIRY_INDICATORS, EXPIRY_STATUSES};
use crate::error::{FailureKind, IdentityError};
use crate::providers::IdentityBackend;
use crate::state::Phase;

/// Whether a backend error means the link was used or timed out.
#[must_use]
pub fn is_expiry(error: &IdentityError) -> bool {
    if error
        .status
        .is_some_and(|status| EXPIRY_STATUSES.contains(&status))
    {
        return true;
    }

    let message = error.message.to_lowercase();
    EXPIRY_INDICATORS
        .iter()
        .any(|indicator| message.contains(indicator))
}

/// Terminal phase for a failed exchange.
#[must_use]
pub fn classify_failure(error: &IdentityError) -> Phase {
    if is_expiry(error) {
        Phase::Expired
    } else if error.message.trim().is_empty() {
        Phase::error(FailureKind::Invalid, FailureKind::Invalid.default_message())
    } else {
        Phase::error(FailureKind::Invalid, error.message.trim())
    }
}

/// Exchange `code` and report the outcome as an action.
///
/// A response without a usable session counts as a failure.
pub async fn exchange<I: IdentityBackend>(identity: &I, code: &str) -> CallbackAction {
    match identity.exchange_code_for_session(code).await {
        Ok(session) if session.is_valid() => CallbackAction::CodeExchanged { session },
        Ok(_) => CallbackAction::CodeExchangeFailed {
            error: IdentityError::new("Code exchange returned no session"),
        },
        Err(error) => {
            tracing::warn!(status = ?error.status, error = %error, "Code exchange failed");
            CallbackAction::CodeExchangeFailed { error }
        },
    }
}
