//! Cached tenant policy flags.
//!
//! The MFA requirement of a tenant changes rarely, so it is cached for a
//! fixed TTL. The cache is an explicit object owned by the environment:
//! tests inject a clock to expire entries and call
//! [`PolicyCache::invalidate`] to drop them.

use crate::providers::PolicyProvider;
use chrono::{DateTime, Utc};
use linkgate_core::environment::Clock;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, Copy)]
struct CachedFlag {
    required: bool,
    fetched_at: DateTime<Utc>,
}

type Entries = HashMap<Option<String>, CachedFlag>;

/// TTL cache in front of a [`PolicyProvider`].
///
/// Clones share the same entries.
#[derive(Clone)]
pub struct PolicyCache<P> {
    provider: P,
    clock: Arc<dyn Clock>,
    ttl: chrono::Duration,
    entries: Arc<Mutex<Entries>>,
}

impl<P: PolicyProvider> PolicyCache<P> {
    /// Create an empty cache.
    #[must_use]
    pub fn new(provider: P, clock: Arc<dyn Clock>, ttl: chrono::Duration) -> Self {
        Self {
            provider,
            clock,
            ttl,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Whether `tenant` requires MFA.
    ///
    /// Provider failures count as "not required" and are not cached.
    pub async fn requires_mfa(&self, tenant: Option<&str>) -> bool {
        let key = tenant.map(ToString::to_string);
        let now = self.clock.now();

        let cached = self.lock().get(&key).copied();
        if let Some(cached) = cached.filter(|flag| now - flag.fetched_at < self.ttl) {
            return cached.required;
        }

        match self.provider.requires_mfa(tenant).await {
            Ok(required) => {
                self.lock().insert(
                    key,
                    CachedFlag {
                        required,
                        fetched_at: now,
                    },
                );
                required
            },
            Err(error) => {
                tracing::warn!(tenant = ?tenant, error = %error, "Policy lookup failed, assuming MFA not required");
                false
            },
        }
    }

    /// Drop every cached flag.
    pub fn invalidate(&self) {
        self.lock().clear();
    }

    /// Number of cached flags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<P> std::fmt::Debug for PolicyCache<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyCache")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(all(test, feature = "test-utils"))]
mod tests {
    use super::*;
    use crate::mocks::MockPolicyProvider;
    use linkgate_testing::{ManualClock, test_clock};

    fn cache(provider: MockPolicyProvider, clock: &ManualClock) -> PolicyCache<MockPolicyProvider> {
        PolicyCache::new(provider, Arc::new(clock.clone()), chrono::Duration::minutes(5))
    }

    #[tokio::test]
    async fn test_flags_are_cached_within_ttl() {
        let provider = MockPolicyProvider::new().with_mfa_tenant("acme");
        let clock = ManualClock::new(test_clock().now());
        let cache = cache(provider.clone(), &clock);

        assert!(cache.requires_mfa(Some("acme")).await);
        clock.advance(chrono::Duration::minutes(4));
        assert!(cache.requires_mfa(Some("acme")).await);

        assert_eq!(provider.calls(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_expired_entries_are_refetched() {
        let provider = MockPolicyProvider::new();
        let clock = ManualClock::new(test_clock().now());
        let cache = cache(provider.clone(), &clock);

        assert!(!cache.requires_mfa(None).await);
        clock.advance(chrono::Duration::minutes(5));
        assert!(!cache.requires_mfa(None).await);

        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let provider = MockPolicyProvider::new().with_mfa_tenant("acme");
        let clock = ManualClock::new(test_clock().now());
        let cache = cache(provider.clone(), &clock);

        cache.requires_mfa(Some("acme")).await;
        cache.invalidate();
        assert!(cache.is_empty());
        cache.requires_mfa(Some("acme")).await;

        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_failures_count_as_not_required_and_are_not_cached() {
        let provider = MockPolicyProvider::new().with_mfa_tenant("acme").failing();
        let clock = ManualClock::new(test_clock().now());
        let cache = cache(provider.clone(), &clock);

        assert!(!cache.requires_mfa(Some("acme")).await);
        assert!(cache.is_empty());
    }
}
