//! Mock provider implementations for testing.
//!
//! This module provides simple, in-memory implementations of all provider traits
//! for use in unit and integration tests. Clones of a mock share their state, so
//! a test keeps one handle for assertions and hands another to the environment.

pub mod activation;
pub mod host;
pub mod identity;
pub mod policy;
pub mod profiles;

pub use activation::MockActivationApi;
pub use host::MockHost;
pub use identity::MockIdentityBackend;
pub use policy::MockPolicyProvider;
pub use profiles::MockProfileDirectory;

use std::sync::{Mutex, MutexGuard};

/// Lock a mock's state, recovering from poisoning caused by a failed test.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
