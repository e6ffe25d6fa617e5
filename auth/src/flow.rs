//! Callback flow driver.
//!
//! Owns the [`Store`] for one mounted callback page. The host mounts the
//! flow with the page URL, reads phases from it, forwards form input and
//! unmounts it when the page goes away.
//!
//! # Example
//!
//! ```ignore
//! let flow = CallbackFlow::mount(url, CallbackConfig::from_env()?, env).await?;
//!
//! flow.wait_for_phase(|phase| *phase != Phase::Loading, Duration::from_secs(20)).await?;
//! if flow.phase().await == Phase::SetPassword {
//!     flow.submit_password("correct-horse", "correct-horse").await?;
//! }
//!
//! flow.unmount().await?;
//! ```

use crate::actions::CallbackAction;
use crate::config::CallbackConfig;
use crate::environment::CallbackEnvironment;
use crate::providers::{ActivationApi, Host, IdentityBackend, PolicyProvider, ProfileDirectory};
use crate::reducers::CallbackReducer;
use crate::state::{CallbackState, FlowLabel, Phase};
use linkgate_runtime::{Store, StoreError};
use std::time::Duration;
use tokio::sync::broadcast;

/// Store type for one callback flow.
pub type CallbackStore<I, A, P, H, Q> = Store<
    CallbackState,
    CallbackAction,
    CallbackEnvironment<I, A, P, H, Q>,
    CallbackReducer<I, A, P, H, Q>,
>;

const PHASE_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// A mounted callback flow.
pub struct CallbackFlow<I, A, P, H, Q>
where
    I: IdentityBackend + Clone + 'static,
    A: ActivationApi + Clone + 'static,
    P: ProfileDirectory + Clone + 'static,
    H: Host + Clone + 'static,
    Q: PolicyProvider + Clone + 'static,
{
    store: CallbackStore<I, A, P, H, Q>,
}

impl<I, A, P, H, Q> CallbackFlow<I, A, P, H, Q>
where
    I: IdentityBackend + Clone + 'static,
    A: ActivationApi + Clone + 'static,
    P: ProfileDirectory + Clone + 'static,
    H: Host + Clone + 'static,
    Q: PolicyProvider + Clone + 'static,
{
    /// Mount the flow for `url`.
    ///
    /// Classification and the chosen branch start immediately; the
    /// returned flow is still `Loading` unless the link failed outright.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] if the store rejects the
    /// mount action.
    pub async fn mount(
        url: impl Into<String>,
        config: CallbackConfig,
        env: CallbackEnvironment<I, A, P, H, Q>,
    ) -> Result<Self, StoreError> {
        let store = Store::new(CallbackState::default(), CallbackReducer::new(config), env);
        store.send(CallbackAction::Mounted { url: url.into() }).await?;
        Ok(Self { store })
    }

    /// Current phase.
    pub async fn phase(&self) -> Phase {
        self.store.state(|state| state.phase.clone()).await
    }

    /// Current flow label.
    pub async fn flow_label(&self) -> FlowLabel {
        self.store.state(|state| state.flow_label).await
    }

    /// Copy of the whole flow state.
    pub async fn snapshot(&self) -> CallbackState {
        self.store.state(Clone::clone).await
    }

    /// Submit the password form.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after unmount.
    pub async fn submit_password(
        &self,
        password: &str,
        confirmation: &str,
    ) -> Result<(), StoreError> {
        self.store
            .send(CallbackAction::submit(password, confirmation))
            .await
            .map(drop)
    }

    /// Abandon the password step.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after unmount.
    pub async fn abort(&self) -> Result<(), StoreError> {
        self.store
            .send(CallbackAction::AbortRequested)
            .await
            .map(drop)
    }

    /// Observe actions produced by effects.
    #[must_use]
    pub fn subscribe_actions(&self) -> broadcast::Receiver<CallbackAction> {
        self.store.subscribe_actions()
    }

    /// Wait until the phase satisfies `predicate`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if `timeout` passes first.
    pub async fn wait_for_phase<F>(&self, predicate: F, timeout: Duration) -> Result<Phase, StoreError>
    where
        F: Fn(&Phase) -> bool,
    {
        tokio::time::timeout(timeout, async {
            loop {
                let phase = self.phase().await;
                if predicate(&phase) {
                    return phase;
                }
                tokio::time::sleep(PHASE_POLL_INTERVAL).await;
            }
        })
        .await
        .map_err(|_| StoreError::Timeout)
    }

    /// Underlying store.
    #[must_use]
    pub const fn store(&self) -> &CallbackStore<I, A, P, H, Q> {
        &self.store
    }

    /// Tear the flow down.
    ///
    /// Stops the notification subscription, the deadline and any pending
    /// navigation, then waits for the remaining effects.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownTimeout`] if effects outlive the
    /// store's shutdown timeout.
    pub async fn unmount(self) -> Result<(), StoreError> {
        let cancelled = self.store.cancel_all();
        tracing::debug!(cancelled, "Callback unmounted");
        self.store.shutdown_default().await
    }
}
