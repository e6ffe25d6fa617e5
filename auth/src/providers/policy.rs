//! Tenant policy trait.

use crate::error::ProviderError;

/// Source of tenant security policy flags.
pub trait PolicyProvider: Send + Sync {
    /// Whether users of `tenant` must complete MFA before landing.
    ///
    /// `None` asks for the platform-wide default.
    ///
    /// # Errors
    ///
    /// Returns error if the policy cannot be read.
    fn requires_mfa(
        &self,
        tenant: Option<&str>,
    ) -> impl std::future::Future<Output = Result<bool, ProviderError>> + Send;
}
