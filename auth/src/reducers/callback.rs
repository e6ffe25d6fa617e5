//! Callback reducer.
//!
//! Owns the phase of one callback flow. Every signal source becomes an
//! action and this reducer is the only place that decides what it means.
//!
//! # Flow
//!
//! 1. `Mounted`: subscribe to backend notifications, classify the link once
//!    and start the matching branch (code exchange, error fragment or
//!    session poll) plus the deadline timer
//! 2. The first valid session from any source resolves the flow to
//!    `SetPassword`; later ones are no-ops
//! 3. Recovery mode always wins the flow label, even after resolution
//! 4. `SubmitPassword`: validate locally, re-read the session, commit
//! 5. On success, build the profile and hand off exactly once
//!
//! # Guards
//!
//! - The resolution guard trips on the first resolution
//! - The navigation guard trips on the first hand-off (or an abort)
//! - The deadline only acts while the phase is still `Loading`

use crate::actions::CallbackAction;
use crate::commit;
use crate::config::CallbackConfig;
use crate::constants::{DEADLINE, SESSION_EVENTS, messages};
use crate::environment::CallbackEnvironment;
use crate::error::{CommitError, FailureKind, IdentityError};
use crate::exchange;
use crate::link::{self, LinkKind};
use crate::listener;
use crate::profile;
use crate::providers::{ActivationApi, Host, IdentityBackend, PolicyProvider, ProfileDirectory};
use crate::state::{
    Branch, CallbackState, FlowLabel, Handoff, Password, Phase, ResolutionSource, Session,
};
use linkgate_core::effect::Effect;
use linkgate_core::reducer::Reducer;
use linkgate_core::{SmallVec, async_effect, cancellable, delay, smallvec};
use std::marker::PhantomData;

type Effects = SmallVec<[Effect<CallbackAction>; 4]>;

/// Callback reducer.
///
/// Generic over the environment's providers so the same reducer runs
/// against mocks and production collaborators.
pub struct CallbackReducer<I, A, P, H, Q> {
    config: CallbackConfig,
    _phantom: PhantomData<(I, A, P, H, Q)>,
}

impl<I, A, P, H, Q> CallbackReducer<I, A, P, H, Q> {
    /// Create a reducer with the given configuration.
    #[must_use]
    pub const fn new(config: CallbackConfig) -> Self {
        Self {
            config,
            _phantom: PhantomData,
        }
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &CallbackConfig {
        &self.config
    }

    fn deadline(&self) -> Effect<CallbackAction> {
        cancellable! {
            id: DEADLINE,
            effect: delay! {
                duration: self.config.deadline,
                action: CallbackAction::DeadlineElapsed
            }
        }
    }
}

impl<I, A, P, H, Q> Clone for CallbackReducer<I, A, P, H, Q> {
    fn clone(&self) -> Self {
        Self::new(self.config.clone())
    }
}

impl<I, A, P, H, Q> std::fmt::Debug for CallbackReducer<I, A, P, H, Q> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackReducer")
            .field("config", &self.config)
            .finish()
    }
}

impl<I, A, P, H, Q> Default for CallbackReducer<I, A, P, H, Q> {
    fn default() -> Self {
        Self::new(CallbackConfig::default())
    }
}

impl<I, A, P, H, Q> CallbackReducer<I, A, P, H, Q>
where
    I: IdentityBackend + Clone + 'static,
    A: ActivationApi + Clone + 'static,
    P: ProfileDirectory + Clone + 'static,
    H: Host + Clone + 'static,
    Q: PolicyProvider + Clone + 'static,
{
    fn mount(
        &self,
        state: &mut CallbackState,
        url: &str,
        env: &CallbackEnvironment<I, A, P, H, Q>,
    ) -> Effects {
        if state.mounted {
            tracing::debug!("Callback already mounted, ignoring");
            return smallvec![Effect::None];
        }
        state.mounted = true;

        // Subscribe before any asynchronous work so no notification is missed.
        let events = env.identity.subscribe();
        let mut effects: Effects = smallvec![
            Effect::Stream(Box::pin(listener::listen(events))).cancellable(SESSION_EVENTS)
        ];

        let link = match link::classify(url) {
            Ok(link) => link,
            Err(error) => {
                tracing::warn!(error = %error, "Unreadable callback URL");
                state.transition(Phase::error(FailureKind::Invalid, messages::INVALID_LINK));
                return effects;
            },
        };

        state.visible_url = Some(link.visible_url.clone());
        let host = env.host.clone();
        let visible_url = link.visible_url;

        match link.kind {
            LinkKind::Code { code } if code.trim().is_empty() => {
                tracing::warn!("Callback link carries an empty code");
                state.branch = Some(Branch::CodeExchange);
                state.transition(Phase::error(FailureKind::Invalid, messages::MISSING_CODE));
                effects.push(async_effect! {
                    host.replace_url(&visible_url);
                    None
                });
            },
            LinkKind::Code { code } => {
                tracing::debug!("Callback link carries a code, exchanging");
                state.branch = Some(Branch::CodeExchange);
                let identity = env.identity.clone();
                // The code leaves the address bar before the exchange starts.
                effects.push(async_effect! {
                    host.replace_url(&visible_url);
                    Some(exchange::exchange(&identity, &code).await)
                });
                effects.push(self.deadline());
            },
            LinkKind::ErrorFragment(fragment) => {
                tracing::warn!(
                    error = ?fragment.error,
                    error_code = ?fragment.error_code,
                    "Callback link carries an error fragment"
                );
                state.branch = Some(Branch::ErrorFragment);
                state.transition(fragment.outcome());
                effects.push(async_effect! {
                    host.replace_url(&visible_url);
                    None
                });
            },
            LinkKind::Bare => {
                tracing::debug!("Callback link carries no credentials, reading session");
                state.branch = Some(Branch::SessionPoll);
                let identity = env.identity.clone();
                effects.push(async_effect! {
                    Some(match identity.current_session().await {
                        Ok(session) => CallbackAction::SessionPolled { session },
                        Err(error) => CallbackAction::SessionPollFailed { error },
                    })
                });
                effects.push(self.deadline());
            },
        }

        effects
    }

    /// Resolve to `SetPassword` unless something already did.
    fn resolve(
        state: &mut CallbackState,
        label: FlowLabel,
        session: Session,
        source: ResolutionSource,
    ) -> Effects {
        if state.phase.is_terminal() {
            tracing::debug!(?source, phase = state.phase.name(), "Late resolution ignored");
            return smallvec![Effect::None];
        }
        if !state.resolution.trip() {
            tracing::debug!(?source, "Already resolved, ignoring");
            return smallvec![Effect::None];
        }

        state.flow_label = label;
        state.transition(Phase::SetPassword);
        state.pending_session = Some(session);
        state.resolved_by = Some(source);
        tracing::info!(?source, ?label, "Callback resolved");

        smallvec![Effect::Cancel(DEADLINE)]
    }

    fn enter_recovery_mode(state: &mut CallbackState, session: Option<Session>) -> Effects {
        if state.phase.is_terminal() {
            tracing::debug!(phase = state.phase.name(), "Recovery mode after terminal phase ignored");
            return smallvec![Effect::None];
        }

        state.flow_label = FlowLabel::Recovery;
        if let Some(session) = session.filter(Session::is_valid) {
            state.pending_session = Some(session);
        }
        state.resolution.trip();

        if state.phase == Phase::Loading {
            state.transition(Phase::SetPassword);
            state.resolved_by = Some(ResolutionSource::RecoveryMode);
            tracing::info!("Callback resolved by recovery mode");
            smallvec![Effect::Cancel(DEADLINE)]
        } else {
            tracing::debug!("Recovery mode relabelled the flow");
            smallvec![Effect::None]
        }
    }

    fn exchange_failed(state: &mut CallbackState, error: &IdentityError) -> Effects {
        if state.resolution.is_tripped() || state.phase != Phase::Loading {
            tracing::debug!(error = %error, "Exchange failure after resolution ignored");
            return smallvec![Effect::None];
        }

        state.transition(exchange::classify_failure(error));
        smallvec![Effect::Cancel(DEADLINE)]
    }

    fn submit(
        &self,
        state: &mut CallbackState,
        password: Password,
        confirmation: &Password,
        env: &CallbackEnvironment<I, A, P, H, Q>,
    ) -> Effects {
        if state.phase != Phase::SetPassword {
            tracing::warn!(phase = state.phase.name(), "Password submitted outside set-password");
            return smallvec![Effect::None];
        }
        if state.submitting {
            tracing::debug!("Commit already in flight, ignoring submission");
            return smallvec![Effect::None];
        }

        state.form_error = None;
        if let Err(error) = commit::validate(&password, confirmation, self.config.min_password_len)
        {
            let error = CommitError::from(error);
            tracing::debug!(error = %error, kind = ?error.kind(), "Password rejected locally");
            state.form_error = Some(error.user_message());
            return smallvec![Effect::None];
        }

        state.submitting = true;
        let identity = env.identity.clone();
        let activation = env.activation.clone();

        smallvec![async_effect! {
            Some(match commit::commit(&identity, &activation, password).await {
                Ok(session) => CallbackAction::PasswordCommitted { session },
                Err(error) => CallbackAction::PasswordCommitFailed { error },
            })
        }]
    }

    /// Build the hand-off once, however many completion signals arrive.
    fn complete(
        &self,
        state: &mut CallbackState,
        session: Session,
        env: &CallbackEnvironment<I, A, P, H, Q>,
    ) -> Effects {
        if !state.navigation.trip() {
            tracing::debug!("Completion already handed off");
            return smallvec![Effect::None];
        }

        let profiles = env.profiles.clone();
        let policy = env.policy.clone();
        let routes = self.config.routes.clone();

        smallvec![async_effect! {
            let profile = profile::build_profile(&profiles, &session).await;
            let mut route = profile::route_for(&profile, &routes);
            if policy.requires_mfa(profile.tenant_id.as_deref()).await {
                route = profile::mfa_route(&route);
            }
            Some(CallbackAction::HandoffReady {
                handoff: Handoff { profile, route },
            })
        }]
    }

    fn abort(&self, state: &mut CallbackState, env: &CallbackEnvironment<I, A, P, H, Q>) -> Effects {
        if state.phase != Phase::SetPassword {
            tracing::debug!(phase = state.phase.name(), "Abort outside set-password ignored");
            return smallvec![Effect::None];
        }

        state.transition(Phase::Cancelled);
        state.navigation.trip();
        state.form_error = None;
        tracing::info!("Password step abandoned");

        let identity = env.identity.clone();
        let host = env.host.clone();
        let login_route = self.config.login_route.clone();

        smallvec![
            Effect::Cancel(DEADLINE),
            async_effect! {
                identity.discard_local_session().await;
                host.navigate(&login_route);
                None
            },
        ]
    }
}

impl<I, A, P, H, Q> Reducer for CallbackReducer<I, A, P, H, Q>
where
    I: IdentityBackend + Clone + 'static,
    A: ActivationApi + Clone + 'static,
    P: ProfileDirectory + Clone + 'static,
    H: Host + Clone + 'static,
    Q: PolicyProvider + Clone + 'static,
{
    type State = CallbackState;
    type Action = CallbackAction;
    type Environment = CallbackEnvironment<I, A, P, H, Q>;

    #[allow(clippy::too_many_lines)]
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        tracing::trace!(action = action.name(), phase = state.phase.name(), "Reducing");

        match action {
            // ═══════════════════════════════════════════════════════════════
            // Mounted: subscribe, classify once, start the branch
            // ═══════════════════════════════════════════════════════════════
            CallbackAction::Mounted { url } => self.mount(state, &url, env),

            // ═══════════════════════════════════════════════════════════════
            // Code exchange
            // ═══════════════════════════════════════════════════════════════
            CallbackAction::CodeExchanged { session } => {
                if session.is_valid() {
                    Self::resolve(state, FlowLabel::Recovery, session, ResolutionSource::CodeExchange)
                } else {
                    Self::exchange_failed(
                        state,
                        &IdentityError::new("Code exchange returned no session"),
                    )
                }
            },

            CallbackAction::CodeExchangeFailed { error } => Self::exchange_failed(state, &error),

            // ═══════════════════════════════════════════════════════════════
            // Session poll fallback
            // ═══════════════════════════════════════════════════════════════
            CallbackAction::SessionPolled { session } => match session {
                Some(session) if session.is_valid() => {
                    Self::resolve(state, FlowLabel::Invite, session, ResolutionSource::SessionPoll)
                },
                _ => {
                    tracing::debug!("No session yet, waiting for notifications");
                    smallvec![Effect::None]
                },
            },

            CallbackAction::SessionPollFailed { error } => {
                tracing::warn!(error = %error, "Session read failed, waiting for notifications");
                smallvec![Effect::None]
            },

            // ═══════════════════════════════════════════════════════════════
            // Backend notifications
            // ═══════════════════════════════════════════════════════════════
            CallbackAction::SessionEstablished { session } => {
                if session.is_valid() {
                    Self::resolve(state, FlowLabel::Invite, session, ResolutionSource::SessionEvent)
                } else {
                    tracing::debug!("Ignoring notification without a usable session");
                    smallvec![Effect::None]
                }
            },

            CallbackAction::RecoveryModeEntered { session } => {
                Self::enter_recovery_mode(state, session)
            },

            // The backend confirms a committed password even when the
            // commit reply itself was lost.
            CallbackAction::ProfileUpdated { session } => {
                if !session.is_valid() || !matches!(state.phase, Phase::SetPassword | Phase::Success)
                {
                    tracing::debug!(phase = state.phase.name(), "Profile update ignored");
                    return smallvec![Effect::None];
                }

                state.transition(Phase::Success);
                state.form_error = None;
                self.complete(state, session, env)
            },

            // ═══════════════════════════════════════════════════════════════
            // Deadline
            // ═══════════════════════════════════════════════════════════════
            CallbackAction::DeadlineElapsed => {
                if state.phase == Phase::Loading {
                    tracing::warn!(deadline = ?self.config.deadline, "Callback did not resolve in time");
                    state.transition(Phase::error(FailureKind::Timeout, messages::TIMED_OUT));
                } else {
                    tracing::debug!(phase = state.phase.name(), "Deadline after resolution ignored");
                }
                smallvec![Effect::None]
            },

            // ═══════════════════════════════════════════════════════════════
            // Password commit
            // ═══════════════════════════════════════════════════════════════
            CallbackAction::SubmitPassword {
                password,
                confirmation,
            } => self.submit(state, password, &confirmation, env),

            CallbackAction::PasswordCommitted { session } => {
                state.submitting = false;
                if !matches!(state.phase, Phase::SetPassword | Phase::Success) {
                    tracing::debug!(phase = state.phase.name(), "Commit result after abort ignored");
                    return smallvec![Effect::None];
                }

                state.transition(Phase::Success);
                self.complete(state, session, env)
            },

            CallbackAction::PasswordCommitFailed { error } => {
                state.submitting = false;
                if state.phase == Phase::SetPassword {
                    tracing::warn!(error = %error, kind = ?error.kind(), "Password commit failed");
                    state.form_error = Some(error.user_message());
                }
                smallvec![Effect::None]
            },

            // ═══════════════════════════════════════════════════════════════
            // Completion
            // ═══════════════════════════════════════════════════════════════
            CallbackAction::HandoffReady { handoff } => {
                tracing::info!(route = %handoff.route, "Hand-off ready");
                state.handoff = Some(handoff.clone());
                smallvec![delay! {
                    duration: self.config.navigation_delay,
                    action: CallbackAction::Navigate { handoff }
                }]
            },

            CallbackAction::Navigate { handoff } => {
                let host = env.host.clone();
                smallvec![async_effect! {
                    host.hand_off(&handoff);
                    None
                }]
            },

            CallbackAction::AbortRequested => self.abort(state, env),
        }
    }
}

#[cfg(all(test, feature = "test-utils"))]
mod tests {
    use super::*;
    use crate::mocks::{
        MockActivationApi, MockHost, MockIdentityBackend, MockPolicyProvider, MockProfileDirectory,
    };
    use crate::policy::PolicyCache;
    use crate::state::OnceGuard;
    use linkgate_testing::{ReducerTest, assertions, test_clock};
    use std::sync::Arc;
    use std::time::Duration;

    type TestReducer = CallbackReducer<
        MockIdentityBackend,
        MockActivationApi,
        MockProfileDirectory,
        MockHost,
        MockPolicyProvider,
    >;

    type TestEnv = CallbackEnvironment<
        MockIdentityBackend,
        MockActivationApi,
        MockProfileDirectory,
        MockHost,
        MockPolicyProvider,
    >;

    fn env() -> TestEnv {
        CallbackEnvironment::new(
            MockIdentityBackend::new(),
            MockActivationApi::new(),
            MockProfileDirectory::new(),
            MockHost::new(),
            PolicyCache::new(
                MockPolicyProvider::new(),
                Arc::new(test_clock()),
                chrono::Duration::minutes(5),
            ),
        )
    }

    fn session() -> Session {
        Session::new("token", "user-42")
    }

    fn loading() -> CallbackState {
        CallbackState {
            mounted: true,
            ..CallbackState::default()
        }
    }

    fn resolved(label: FlowLabel) -> CallbackState {
        let mut resolution = OnceGuard::default();
        resolution.trip();
        CallbackState {
            phase: Phase::SetPassword,
            flow_label: label,
            resolution,
            pending_session: Some(session()),
            mounted: true,
            ..CallbackState::default()
        }
    }

    #[test]
    fn test_mount_with_code_subscribes_and_starts_deadline() {
        let env = env();
        let identity = env.identity.clone();

        ReducerTest::new(TestReducer::default())
            .with_env(env)
            .given_state(CallbackState::default())
            .when_action(CallbackAction::Mounted {
                url: "/auth/callback?code=abc123".to_string(),
            })
            .then_state(|state| {
                assert_eq!(state.phase, Phase::Loading);
                assert_eq!(state.branch, Some(Branch::CodeExchange));
                assert_eq!(state.visible_url.as_deref(), Some("/auth/callback"));
            })
            .then_effects(|effects| {
                assertions::assert_registers(effects, SESSION_EVENTS);
                assertions::assert_registers(effects, DEADLINE);
                assert_eq!(assertions::find_delay(effects), Some(Duration::from_secs(15)));
                assertions::assert_has_future_effect(effects);
            })
            .run();

        assert_eq!(identity.subscriptions(), 1);
    }

    #[test]
    fn test_second_mount_is_ignored() {
        ReducerTest::new(TestReducer::default())
            .with_env(env())
            .given_state(loading())
            .when_action(CallbackAction::Mounted {
                url: "/auth/callback?code=abc123".to_string(),
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_error_fragment_is_terminal_without_deadline() {
        ReducerTest::new(TestReducer::default())
            .with_env(env())
            .given_state(CallbackState::default())
            .when_action(CallbackAction::Mounted {
                url: "/auth/callback#error=access_denied&error_code=otp_expired".to_string(),
            })
            .then_state(|state| {
                assert_eq!(state.phase, Phase::Expired);
                assert_eq!(state.branch, Some(Branch::ErrorFragment));
            })
            .then_effects(|effects| {
                assert!(!effects.iter().any(|e| e.registers(DEADLINE)));
            })
            .run();
    }

    #[test]
    fn test_empty_code_fails_without_exchange() {
        ReducerTest::new(TestReducer::default())
            .with_env(env())
            .given_state(CallbackState::default())
            .when_action(CallbackAction::Mounted {
                url: "/auth/callback?code=".to_string(),
            })
            .then_state(|state| {
                assert_eq!(
                    state.phase,
                    Phase::error(FailureKind::Invalid, messages::MISSING_CODE)
                );
            })
            .then_effects(|effects| {
                assert!(!effects.iter().any(|e| e.registers(DEADLINE)));
            })
            .run();
    }

    #[test]
    fn test_code_exchange_resolves_as_recovery() {
        ReducerTest::new(TestReducer::default())
            .with_env(env())
            .given_state(loading())
            .when_action(CallbackAction::CodeExchanged { session: session() })
            .then_state(|state| {
                assert_eq!(state.phase, Phase::SetPassword);
                assert_eq!(state.flow_label, FlowLabel::Recovery);
                assert_eq!(state.resolved_by, Some(ResolutionSource::CodeExchange));
                assert!(state.resolution.is_tripped());
                assert!(state.pending_session.is_some());
            })
            .then_effects(|effects| assertions::assert_cancels(effects, DEADLINE))
            .run();
    }

    #[test]
    fn test_second_resolution_is_a_noop() {
        ReducerTest::new(TestReducer::default())
            .with_env(env())
            .given_state(resolved(FlowLabel::Recovery))
            .when_action(CallbackAction::SessionEstablished { session: session() })
            .then_state(|state| {
                assert_eq!(state.flow_label, FlowLabel::Recovery);
                assert_eq!(state.phase, Phase::SetPassword);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_recovery_mode_overrides_invite_label() {
        ReducerTest::new(TestReducer::default())
            .with_env(env())
            .given_state(resolved(FlowLabel::Invite))
            .when_action(CallbackAction::RecoveryModeEntered { session: None })
            .then_state(|state| {
                assert_eq!(state.flow_label, FlowLabel::Recovery);
                assert_eq!(state.phase, Phase::SetPassword);
                assert!(state.pending_session.is_some());
            })
            .run();
    }

    #[test]
    fn test_recovery_mode_never_revives_terminal_phase() {
        ReducerTest::new(TestReducer::default())
            .with_env(env())
            .given_state(CallbackState {
                phase: Phase::Expired,
                ..loading()
            })
            .when_action(CallbackAction::RecoveryModeEntered {
                session: Some(session()),
            })
            .then_state(|state| {
                assert_eq!(state.phase, Phase::Expired);
                assert_eq!(state.flow_label, FlowLabel::Invite);
            })
            .run();
    }

    #[test]
    fn test_exchange_failure_is_classified_and_clears_deadline() {
        ReducerTest::new(TestReducer::default())
            .with_env(env())
            .given_state(loading())
            .when_action(CallbackAction::CodeExchangeFailed {
                error: IdentityError::new("Email link is invalid or has expired").with_status(403),
            })
            .then_state(|state| assert_eq!(state.phase, Phase::Expired))
            .then_effects(|effects| assertions::assert_cancels(effects, DEADLINE))
            .run();
    }

    #[test]
    fn test_exchange_failure_after_event_resolution_is_ignored() {
        ReducerTest::new(TestReducer::default())
            .with_env(env())
            .given_state(resolved(FlowLabel::Invite))
            .when_action(CallbackAction::CodeExchangeFailed {
                error: IdentityError::new("Code already used"),
            })
            .then_state(|state| assert_eq!(state.phase, Phase::SetPassword))
            .run();
    }

    #[test]
    fn test_deadline_forces_error_while_loading() {
        ReducerTest::new(TestReducer::default())
            .with_env(env())
            .given_state(loading())
            .when_action(CallbackAction::DeadlineElapsed)
            .then_state(|state| {
                assert!(matches!(
                    &state.phase,
                    Phase::Error { reason: FailureKind::Timeout, message } if !message.is_empty()
                ));
            })
            .then_effects(|effects| assertions::assert_does_not_cancel(effects, DEADLINE))
            .run();
    }

    #[test]
    fn test_deadline_after_resolution_is_a_noop() {
        ReducerTest::new(TestReducer::default())
            .with_env(env())
            .given_state(resolved(FlowLabel::Invite))
            .when_action(CallbackAction::DeadlineElapsed)
            .then_state(|state| assert_eq!(state.phase, Phase::SetPassword))
            .run();
    }

    #[test]
    fn test_short_password_never_reaches_network() {
        let env = env();
        let activation = env.activation.clone();

        ReducerTest::new(TestReducer::default())
            .with_env(env)
            .given_state(resolved(FlowLabel::Invite))
            .when_action(CallbackAction::submit("short", "short"))
            .then_state(|state| {
                assert!(state.form_error.is_some());
                assert!(!state.submitting);
            })
            .then_effects(assertions::assert_no_effects)
            .run();

        assert_eq!(activation.call_count(), 0);
    }

    #[test]
    fn test_valid_password_starts_commit() {
        ReducerTest::new(TestReducer::default())
            .with_env(env())
            .given_state(CallbackState {
                form_error: Some("previous".to_string()),
                ..resolved(FlowLabel::Invite)
            })
            .when_action(CallbackAction::submit("correct-horse", "correct-horse"))
            .then_state(|state| {
                assert!(state.submitting);
                assert!(state.form_error.is_none());
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn test_double_submission_is_ignored() {
        ReducerTest::new(TestReducer::default())
            .with_env(env())
            .given_state(CallbackState {
                submitting: true,
                ..resolved(FlowLabel::Invite)
            })
            .when_action(CallbackAction::submit("correct-horse", "correct-horse"))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_commit_failure_keeps_set_password() {
        ReducerTest::new(TestReducer::default())
            .with_env(env())
            .given_state(CallbackState {
                submitting: true,
                ..resolved(FlowLabel::Invite)
            })
            .when_action(CallbackAction::PasswordCommitFailed {
                error: CommitError::Rejected {
                    status: 422,
                    message: "Password is too weak".to_string(),
                },
            })
            .then_state(|state| {
                assert_eq!(state.phase, Phase::SetPassword);
                assert_eq!(state.form_error.as_deref(), Some("Password is too weak"));
                assert!(!state.submitting);
            })
            .run();
    }

    #[test]
    fn test_completion_is_handed_off_once() {
        let reducer = TestReducer::default();
        let env = env();
        let mut state = CallbackState {
            submitting: true,
            ..resolved(FlowLabel::Invite)
        };

        let first = reducer.reduce(
            &mut state,
            CallbackAction::PasswordCommitted { session: session() },
            &env,
        );
        let second = reducer.reduce(
            &mut state,
            CallbackAction::ProfileUpdated { session: session() },
            &env,
        );

        assert_eq!(state.phase, Phase::Success);
        assert!(state.navigation.is_tripped());
        assertions::assert_has_future_effect(&first[..]);
        assertions::assert_no_effects(&second[..]);
    }

    #[test]
    fn test_profile_update_while_loading_is_ignored() {
        ReducerTest::new(TestReducer::default())
            .with_env(env())
            .given_state(loading())
            .when_action(CallbackAction::ProfileUpdated { session: session() })
            .then_state(|state| {
                assert_eq!(state.phase, Phase::Loading);
                assert!(!state.navigation.is_tripped());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_profile_update_after_lost_commit_reply_completes() {
        let reducer = TestReducer::default();
        let env = env();
        let mut state = CallbackState {
            submitting: true,
            ..resolved(FlowLabel::Invite)
        };

        reducer.reduce(
            &mut state,
            CallbackAction::PasswordCommitFailed {
                error: CommitError::Transport("connection reset".to_string()),
            },
            &env,
        );
        assert_eq!(state.form_error.as_deref(), Some(messages::COMMIT_FAILED));

        let effects = reducer.reduce(
            &mut state,
            CallbackAction::ProfileUpdated { session: session() },
            &env,
        );

        assert_eq!(state.phase, Phase::Success);
        assert!(state.form_error.is_none());
        assert!(state.navigation.is_tripped());
        assertions::assert_has_future_effect(&effects[..]);
    }

    #[test]
    fn test_local_rejection_uses_commit_copy() {
        ReducerTest::new(TestReducer::default())
            .with_env(env())
            .given_state(resolved(FlowLabel::Invite))
            .when_action(CallbackAction::submit("correct-horse", "correct-horsf"))
            .then_state(|state| {
                assert_eq!(
                    state.form_error,
                    Some(CommitError::from(crate::error::ValidationError::Mismatch).user_message())
                );
            })
            .run();
    }

    #[test]
    fn test_handoff_waits_for_navigation_delay() {
        let handoff = Handoff {
            profile: crate::profile::from_session(&session()),
            route: "/portal".to_string(),
        };

        ReducerTest::new(TestReducer::new(
            CallbackConfig::default().with_navigation_delay(Duration::from_millis(500)),
        ))
        .with_env(env())
        .given_state(CallbackState {
            phase: Phase::Success,
            ..loading()
        })
        .when_action(CallbackAction::HandoffReady { handoff })
        .then_state(|state| assert!(state.handoff.is_some()))
        .then_effects(|effects| {
            assert_eq!(assertions::find_delay(effects), Some(Duration::from_millis(500)));
        })
        .run();
    }

    #[test]
    fn test_abort_cancels_locally() {
        ReducerTest::new(TestReducer::default())
            .with_env(env())
            .given_state(resolved(FlowLabel::Recovery))
            .when_action(CallbackAction::AbortRequested)
            .then_state(|state| {
                assert_eq!(state.phase, Phase::Cancelled);
                assert!(state.navigation.is_tripped());
                assert!(state.pending_session.is_none());
            })
            .then_effects(|effects| {
                assertions::assert_cancels(effects, DEADLINE);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    fn test_abort_while_loading_is_ignored() {
        ReducerTest::new(TestReducer::default())
            .with_env(env())
            .given_state(loading())
            .when_action(CallbackAction::AbortRequested)
            .then_state(|state| assert_eq!(state.phase, Phase::Loading))
            .then_effects(assertions::assert_no_effects)
            .run();
    }
}
