//! Error fragments of implicit-flow links.
//!
//! The identity backend reports rejected implicit-flow links in the URL
//! fragment: `#error=..&error_code=..&error_description=..`. The fragment
//! never reaches a server, so this is the only place it is read.

use crate::constants::EXPIRED_FRAGMENT_CODES;
use crate::error::FailureKind;
use crate::state::Phase;

/// Error parameters read from a fragment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FragmentError {
    /// `error` parameter.
    pub error: Option<String>,
    /// `error_code` parameter.
    pub error_code: Option<String>,
    /// `error_description` parameter, decoded.
    pub error_description: Option<String>,
}

impl FragmentError {
    /// Whether the link was consumed or timed out.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        EXPIRED_FRAGMENT_CODES.iter().any(|code| {
            self.error.as_deref() == Some(*code) || self.error_code.as_deref() == Some(*code)
        })
    }

    /// Terminal phase for this fragment.
    ///
    /// Expired links show the expired-link copy, not the raw description.
    #[must_use]
    pub fn outcome(&self) -> Phase {
        if self.is_expired() {
            return Phase::Expired;
        }

        let message = self
            .error_description
            .as_deref()
            .map(str::trim)
            .filter(|description| !description.is_empty())
            .unwrap_or(FailureKind::Invalid.default_message());
        Phase::error(FailureKind::Invalid, message)
    }
}

/// Read the error parameters from `fragment` (without the leading `#`).
///
/// Returns `None` when the fragment has neither an `error` nor an
/// `error_code` parameter. `+` decodes
/// to a space and percent escapes are resolved; the first occurrence of a
/// repeated key wins.
#[must_use]
pub fn parse(fragment: &str) -> Option<FragmentError> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(fragment).ok()?;
    let first = |key: &str| {
        pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value.clone())
    };

    let error = first("error");
    let error_code = first("error_code");
    if error.is_none() && error_code.is_none() {
        return None;
    }

    Some(FragmentError {
        error,
        error_code,
        error_description: first("error_description"),
    })
}
