//! Mock profile directory for testing.

use super::lock;
use crate::error::ProviderError;
use crate::providers::ProfileDirectory;
use crate::state::UserProfile;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Mock profile directory.
///
/// Uses in-memory storage keyed by subject id.
#[derive(Debug, Clone, Default)]
pub struct MockProfileDirectory {
    profiles: Arc<Mutex<HashMap<String, UserProfile>>>,
    failing: Arc<AtomicBool>,
    lookups: Arc<AtomicUsize>,
}

impl MockProfileDirectory {
    /// Create an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `profile`.
    #[must_use]
    pub fn with_profile(self, profile: UserProfile) -> Self {
        lock(&self.profiles).insert(profile.id.clone(), profile);
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
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl ProfileDirectory for MockProfileDirectory {
    fn fetch_profile(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Option<UserProfile>, ProviderError>> + Send {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let result = if self.failing.load(Ordering::SeqCst) {
            Err(ProviderError("profile store offline".to_string()))
        } else {
            Ok(lock(&self.profiles).get(user_id).cloned())
        };

        async move { result }
    }
}
