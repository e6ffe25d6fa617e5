//! Identity backend trait.

use crate::error::IdentityError;
use crate::state::Session;
use futures::Stream;
use std::pin::Pin;

/// Lifecycle notification from the identity backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// First notification after subscribing, with any stored session.
    InitialSession(Option<Session>),
    /// A session was established.
    SignedIn(Session),
    /// The session was established through a password-recovery link.
    PasswordRecovery(Option<Session>),
    /// User attributes changed.
    UserUpdated(Option<Session>),
    /// The session ended.
    SignedOut,
    /// The access token was rotated.
    TokenRefreshed(Session),
}

/// Stream of lifecycle notifications, live until dropped.
pub type SessionEvents = Pin<Box<dyn Stream<Item = SessionEvent> + Send>>;

/// Identity backend.
///
/// Issues and validates sessions and one-time link credentials.
///
/// # Implementation Notes
///
/// - `subscribe` is synchronous so callers can register before starting any
///   asynchronous work; notifications emitted after it returns must be
///   delivered on the returned stream.
/// - `discard_local_session` is local-only and must not call the network.
pub trait IdentityBackend: Send + Sync {
    /// Subscribe to lifecycle notifications.
    fn subscribe(&self) -> SessionEvents;

    /// Exchange a one-time code for a session.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The code was already used or has expired
    /// - The code is unknown or malformed
    /// - Network request fails
    fn exchange_code_for_session(
        &self,
        code: &str,
    ) -> impl std::future::Future<Output = Result<Session, IdentityError>> + Send;

    /// Read the currently established session, if any.
    ///
    /// # Errors
    ///
    /// Returns error if the session store cannot be read.
    fn current_session(
        &self,
    ) -> impl std::future::Future<Output = Result<Option<Session>, IdentityError>> + Send;

    /// Forget the locally held session.
    fn discard_local_session(&self) -> impl std::future::Future<Output = ()> + Send;
}
