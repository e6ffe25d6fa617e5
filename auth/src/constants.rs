//! Callback flow constants.
//!
//! User-facing copy, classification tables and effect ids shared by the
//! reducer and its helpers.

use linkgate_core::effect::EffectId;

/// User-facing copy for each terminal or local failure.
pub mod messages {
    /// Shown when the link was already used or its validity window passed.
    pub const EXPIRED_LINK: &str =
        "This link has expired or has already been used. Please request a new link.";

    /// Shown when the deadline passes without the session resolving.
    pub const TIMED_OUT: &str =
        "We couldn't verify your link in time. Please request a fresh link and try again.";

    /// Fallback when the backend rejects a link without a usable description.
    pub const INVALID_LINK: &str = "This link is invalid. Please request a new link.";

    /// Shown when the password form is submitted but no session can be read.
    pub const SESSION_LOST: &str =
        "Your session has expired. Please click the link in your email again.";

    /// Fallback when the finalization API fails without an error body.
    pub const COMMIT_FAILED: &str = "We couldn't set your password. Please try again.";

    /// Shown when the link carries an empty code parameter.
    pub const MISSING_CODE: &str =
        "This link is missing its verification code. Please request a new link.";

    /// Generic password-form copy.
    pub const INVALID_PASSWORD: &str = "Please check your password and try again.";
}

/// Case-insensitive substrings that mark a backend error as an expired/used link.
pub const EXPIRY_INDICATORS: [&str; 5] = ["expired", "invalid", "already", "used", "not found"];

/// HTTP statuses that mark a code-exchange failure as an expired/used link.
pub const EXPIRY_STATUSES: [u16; 3] = [400, 401, 422];

/// Fragment `error` / `error_code` values that mark a link as expired.
pub const EXPIRED_FRAGMENT_CODES: [&str; 2] = ["otp_expired", "access_denied"];

/// Query parameter carrying the one-time exchange code.
pub const CODE_PARAM: &str = "code";

/// Effect id of the deadline timer.
pub const DEADLINE: EffectId = EffectId::new("callback.deadline");

/// Effect id of the identity-backend event subscription.
pub const SESSION_EVENTS: EffectId = EffectId::new("callback.session_events");

/// Path of the finalization endpoint, relative to the server URL.
pub const ACTIVATE_ACCOUNT_PATH: &str = "/auth/activate-account";
