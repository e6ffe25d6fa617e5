//! Callback environment.
//!
//! This module defines the environment type for dependency injection
//! in the callback reducer.

use crate::policy::PolicyCache;
use crate::providers::{ActivationApi, Host, IdentityBackend, PolicyProvider, ProfileDirectory};

/// Callback environment.
///
/// Contains all external dependencies needed by the callback reducer.
///
/// # Type Parameters
///
/// - `I`: Identity backend
/// - `A`: Finalization API
/// - `P`: Profile directory
/// - `H`: Host application
/// - `Q`: Policy provider behind the cache
#[derive(Clone)]
pub struct CallbackEnvironment<I, A, P, H, Q>
where
    I: IdentityBackend + Clone,
    A: ActivationApi + Clone,
    P: ProfileDirectory + Clone,
    H: Host + Clone,
    Q: PolicyProvider + Clone,
{
    /// Identity backend.
    pub identity: I,

    /// Finalization API (`POST /auth/activate-account`).
    pub activation: A,

    /// Profile directory.
    pub profiles: P,

    /// Host application.
    pub host: H,

    /// Cached tenant policy flags.
    pub policy: PolicyCache<Q>,
}

impl<I, A, P, H, Q> CallbackEnvironment<I, A, P, H, Q>
where
    I: IdentityBackend + Clone,
    A: ActivationApi + Clone,
    P: ProfileDirectory + Clone,
    H: Host + Clone,
    Q: PolicyProvider + Clone,
{
    /// Create a new callback environment.
    #[must_use]
    pub const fn new(
        identity: I,
        activation: A,
        profiles: P,
        host: H,
        policy: PolicyCache<Q>,
    ) -> Self {
        Self {
            identity,
            activation,
            profiles,
            host,
            policy,
        }
    }
}
