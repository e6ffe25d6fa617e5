//! Callback link classification.
//!
//! A callback URL is classified exactly once, when the flow mounts. The
//! result picks one entry strategy for the rest of the flow and tells the
//! host what to leave in the address bar.

use crate::constants::CODE_PARAM;
use crate::error::LinkError;
use crate::fragment::{self, FragmentError};

/// Entry strategy for a callback URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkKind {
    /// `?code=` present. The code may be empty.
    Code {
        /// One-time exchange code
        code: String,
    },

    /// No code, but the fragment carries an `error` or `error_code`.
    ErrorFragment(FragmentError),

    /// Neither: fall back to reading an existing session.
    Bare,
}

/// Outcome of [`classify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedLink {
    /// Selected strategy.
    pub kind: LinkKind,
    /// URL the host should show once credentials are removed.
    pub visible_url: String,
}

impl ClassifiedLink {
    /// Whether the visible URL differs from the original one.
    #[must_use]
    pub fn strips(&self, original: &str) -> bool {
        self.visible_url != original
    }
}

/// Classify a callback URL.
///
/// Accepts absolute URLs as well as path-only ones. The `code` parameter is
/// removed from the visible URL, other query parameters are kept. An error
/// fragment is removed entirely.
///
/// # Errors
///
/// Returns [`LinkError::Empty`] if the URL is blank.
pub fn classify(url: &str) -> Result<ClassifiedLink, LinkError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(LinkError::Empty);
    }

    let (before_fragment, hash) = match url.split_once('#') {
        Some((head, hash)) => (head, Some(hash)),
        None => (url, None),
    };
    let (path, query) = match before_fragment.split_once('?') {
        Some((path, query)) => (path, query),
        None => (before_fragment, ""),
    };

    // Decoding is lossy: malformed escapes become U+FFFD instead of failing.
    let mut params: Vec<(String, String)> = serde_urlencoded::from_str(query).unwrap_or_default();

    if let Some(index) = params.iter().position(|(key, _)| key == CODE_PARAM) {
        let (_, code) = params.remove(index);
        params.retain(|(key, _)| key != CODE_PARAM);

        let remaining = serde_urlencoded::to_string(&params).unwrap_or_default();
        let mut visible_url = join(path, &remaining);
        if let Some(hash) = hash {
            visible_url.push('#');
            visible_url.push_str(hash);
        }

        return Ok(ClassifiedLink {
            kind: LinkKind::Code { code },
            visible_url,
        });
    }

    if let Some(error) = hash.and_then(fragment::parse) {
        return Ok(ClassifiedLink {
            kind: LinkKind::ErrorFragment(error),
            visible_url: before_fragment.to_string(),
        });
    }

    Ok(ClassifiedLink {
        kind: LinkKind::Bare,
        visible_url: url.to_string(),
    })
}

fn join(path: &str, query: &str) -> String {
    if query.is_empty() {
        path.to_string()
    } else {
        format!("{path}?{query}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_is_extracted_and_stripped() {
        let link = classify("https://app.example.com/auth/callback?code=abc123").ok();

        assert_eq!(
            link,
            Some(ClassifiedLink {
                kind: LinkKind::Code {
                    code: "abc123".to_string()
                },
                visible_url: "https://app.example.com/auth/callback".to_string(),
            })
        );
    }

    #[test]
    fn test_other_query_parameters_survive() {
        let link = classify("/auth/callback?lang=de&code=xyz&next=%2Fhome").ok();

        let visible = link.map(|l| l.visible_url);
        assert_eq!(visible.as_deref(), Some("/auth/callback?lang=de&next=%2Fhome"));
    }

    #[test]
    fn test_code_wins_over_error_fragment() {
        let link = classify("/auth/callback?code=abc#error=access_denied").ok();

        assert!(matches!(
            link.map(|l| l.kind),
            Some(LinkKind::Code { code }) if code == "abc"
        ));
    }

    #[test]
    fn test_empty_code_still_selects_code_branch() {
        let link = classify("/auth/callback?code=").ok();

        assert!(matches!(
            link.map(|l| l.kind),
            Some(LinkKind::Code { code }) if code.is_empty()
        ));
    }

    #[test]
    fn test_error_fragment_is_removed() {
        let url = "/auth/callback#error=access_denied&error_code=otp_expired&error_description=Email+link+is+invalid";
        let link = classify(url).ok();

        assert!(link.as_ref().is_some_and(|l| l.strips(url)));
        let link = link.map(|l| (l.visible_url, l.kind));
        assert!(matches!(
            link,
            Some((visible, LinkKind::ErrorFragment(error)))
                if visible == "/auth/callback" && error.is_expired()
        ));
    }

    #[test]
    fn test_error_code_only_fragment_is_removed() {
        let url = "/auth/callback#error_code=otp_expired&error_description=Email+link+is+invalid";
        let link = classify(url).ok();

        assert!(link.as_ref().is_some_and(|l| l.strips(url)));
        let link = link.map(|l| (l.visible_url, l.kind));
        assert!(matches!(
            link,
            Some((visible, LinkKind::ErrorFragment(error)))
                if visible == "/auth/callback" && error.error.is_none() && error.is_expired()
        ));
    }

    #[test]
    fn test_bad_escapes_do_not_reject_the_link() {
        let link = classify("/auth/callback?code=abc&note=%E0%A4");

        assert!(matches!(
            link.map(|l| l.kind),
            Ok(LinkKind::Code { code }) if code == "abc"
        ));
    }

    #[test]
    fn test_bare_link_is_left_alone() {
        let url = "/auth/callback#access_token=abc&type=recovery";
        let link = classify(url).ok();

        assert_eq!(link.as_ref().map(|l| &l.kind), Some(&LinkKind::Bare));
        assert!(link.is_some_and(|l| !l.strips(url)));
    }

    #[test]
    fn test_empty_url_is_rejected() {
        assert_eq!(classify("   "), Err(LinkError::Empty));
    }
}
