//! Mock policy provider for testing.

use super::lock;
use crate::error::ProviderError;
use crate::providers::PolicyProvider;
use std::collections::HashSet;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Mock policy provider.
///
/// Tenants added with [`MockPolicyProvider::with_mfa_tenant`] require MFA;
/// every other tenant, and the platform default, does not.
#[derive(Debug, Clone, Default)]
pub struct MockPolicyProvider {
    mfa_tenants: Arc<Mutex<HashSet<String>>>,
    failing: Arc<AtomicBool>,
    calls: Arc<AtomicUsize>,
}

impl MockPolicyProvider {
    /// Create a provider where nothing requires MFA.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Require MFA for `tenant`.
    #[must_use]
    pub fn with_mfa_tenant(self, tenant: impl Into<String>) -> Self {
        lock(&self.mfa_tenants).insert(tenant.into());
        self
    }

    /// Make every lookup fail.
    #[must_use]
    pub fn failing(self) -> Self {
        self.failing.store(true, Ordering::SeqCst);
        self
    }

    /// Number of lookups.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PolicyProvider for MockPolicyProvider {
    fn requires_mfa(
        &self,
        tenant: Option<&str>,
    ) -> impl Future<Output = Result<bool, ProviderError>> + Send {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let result = if self.failing.load(Ordering::SeqCst) {
            Err(ProviderError("policy service offline".to_string()))
        } else {
            Ok(tenant.is_some_and(|tenant| lock(&self.mfa_tenants).contains(tenant)))
        };

        async move { result }
    }
}
