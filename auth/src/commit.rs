//! Password commit.
//!
//! Validation is purely local. Only a valid password reaches the network,
//! and only when a session can still be read.

use crate::error::{CommitError, ValidationError};
use crate::providers::{ActivationApi, ActivationRequest, IdentityBackend};
use crate::state::{Password, Session};

/// Check length and confirmation.
///
/// # Errors
///
/// Returns [`ValidationError::TooShort`] for passwords under `min_len`
/// characters and [`ValidationError::Mismatch`] when the confirmation differs.
pub fn validate(
    password: &Password,
    confirmation: &Password,
    min_len: usize,
) -> Result<(), ValidationError> {
    if password.char_count() < min_len {
        return Err(ValidationError::TooShort { min: min_len });
    }
    if password != confirmation {
        return Err(ValidationError::Mismatch);
    }
    Ok(())
}

/// Re-read the session and commit the password for its subject.
///
/// Returns the session the password was committed for.
///
/// # Errors
///
/// - [`CommitError::SessionLost`] if no usable session can be read; the
///   finalization API is not called
/// - Any error from [`ActivationApi::activate_account`]
pub async fn commit<I, A>(
    identity: &I,
    activation: &A,
    password: Password,
) -> Result<Session, CommitError>
where
    I: IdentityBackend,
    A: ActivationApi,
{
    let session = match identity.current_session().await {
        Ok(Some(session)) if session.is_valid() => session,
        Ok(_) => return Err(CommitError::SessionLost),
        Err(error) => {
            tracing::warn!(error = %error, "Session read failed at commit time");
            return Err(CommitError::SessionLost);
        },
    };

    let request = ActivationRequest {
        user_id: session.user.id.clone(),
        password,
    };
    activation
        .activate_account(&session.access_token, &request)
        .await?;

    tracing::info!(user_id = %session.user.id, "Password committed");
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_mismatch_is_rejected() {
        let result = validate(
            &Password::new("correct-horse"),
            &Password::new("correct-horsf"),
            8,
        );
        assert_eq!(result, Err(ValidationError::Mismatch));
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let password = Password::new("ääääääää");
        assert_eq!(validate(&password, &password, 8), Ok(()));
    }

    proptest! {
        #[test]
        fn short_passwords_are_rejected(password in "[a-zA-Z0-9]{0,7}") {
            let password = Password::new(password);
            prop_assert_eq!(
                validate(&password, &password, 8),
                Err(ValidationError::TooShort { min: 8 })
            );
        }

        #[test]
        fn long_matching_passwords_pass(password in "[a-zA-Z0-9!@#]{8,64}") {
            let password = Password::new(password);
            prop_assert_eq!(validate(&password, &password, 8), Ok(()));
        }
    }

    #[cfg(feature = "test-utils")]
    mod remote {
        use super::*;
        use crate::mocks::{MockActivationApi, MockIdentityBackend};

        #[tokio::test]
        async fn test_commit_uses_current_session() {
            let identity = MockIdentityBackend::new()
                .with_current_session(Some(Session::new("token-7", "user-7")));
            let activation = MockActivationApi::new();

            let session = tokio_test::assert_ok!(
                commit(&identity, &activation, Password::new("correct-horse")).await
            );

            assert_eq!(session.user.id, "user-7");
            let requests = activation.requests();
            assert_eq!(requests.len(), 1);
            assert_eq!(requests[0].0, "token-7");
            assert_eq!(requests[0].1.user_id, "user-7");
        }

        #[tokio::test]
        async fn test_missing_session_skips_the_network() {
            let identity = MockIdentityBackend::new();
            let activation = MockActivationApi::new();

            let error = tokio_test::assert_err!(
                commit(&identity, &activation, Password::new("correct-horse")).await
            );

            assert_eq!(error, CommitError::SessionLost);
            assert_eq!(activation.call_count(), 0);
        }

        #[tokio::test]
        async fn test_unreadable_session_counts_as_lost() {
            let identity = MockIdentityBackend::new()
                .with_read_failure(crate::error::IdentityError::new("storage unavailable"));
            let activation = MockActivationApi::new();

            let error = tokio_test::assert_err!(
                commit(&identity, &activation, Password::new("correct-horse")).await
            );

            assert_eq!(error, CommitError::SessionLost);
        }

        #[tokio::test]
        async fn test_rejection_is_passed_through() {
            let identity = MockIdentityBackend::new()
                .with_current_session(Some(Session::new("token-7", "user-7")));
            let activation = MockActivationApi::new().with_rejection(409, "Account already active");

            let error = tokio_test::assert_err!(
                commit(&identity, &activation, Password::new("correct-horse")).await
            );

            assert_eq!(error.user_message(), "Account already active");
        }
    }
}
