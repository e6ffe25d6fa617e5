//! Profile directory trait.

use crate::error::ProviderError;
use crate::state::UserProfile;

/// Persistent user-profile storage.
///
/// Query-only: the callback flow never writes profiles.
pub trait ProfileDirectory: Send + Sync {
    /// Load the stored profile for `user_id`.
    ///
    /// Returns `Ok(None)` if no profile has been stored yet.
    ///
    /// # Errors
    ///
    /// Returns error if the storage cannot be reached.
    fn fetch_profile(
        &self,
        user_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<UserProfile>, ProviderError>> + Send;
}
