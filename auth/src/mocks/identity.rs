//! Mock identity backend for testing.

use super::lock;
use crate::error::IdentityError;
use crate::providers::{IdentityBackend, SessionEvent, SessionEvents};
use crate::state::Session;
use futures::StreamExt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

#[derive(Debug)]
struct Inner {
    events: broadcast::Sender<SessionEvent>,
    replay: Mutex<Vec<SessionEvent>>,
    exchange_result: Mutex<Result<Session, IdentityError>>,
    exchange_delay: Mutex<Duration>,
    current_session: Mutex<Option<Session>>,
    read_failure: Mutex<Option<IdentityError>>,
    exchanged_codes: Mutex<Vec<String>>,
    session_reads: AtomicUsize,
    subscriptions: AtomicUsize,
    discarded: AtomicBool,
}

/// Mock identity backend.
///
/// Notifications are pushed with [`MockIdentityBackend::emit`]; replay
/// events are delivered to every new subscriber first. A successful exchange
/// also establishes the session for later [`IdentityBackend::current_session`]
/// reads.
#[derive(Debug, Clone)]
pub struct MockIdentityBackend {
    inner: Arc<Inner>,
}

impl MockIdentityBackend {
    /// Create a backend with no session whose exchanges fail as unknown codes.
    #[must_use]
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            inner: Arc::new(Inner {
                events,
                replay: Mutex::new(Vec::new()),
                exchange_result: Mutex::new(Err(
                    IdentityError::new("Flow state not found").with_status(404)
                )),
                exchange_delay: Mutex::new(Duration::ZERO),
                current_session: Mutex::new(None),
                read_failure: Mutex::new(None),
                exchanged_codes: Mutex::new(Vec::new()),
                session_reads: AtomicUsize::new(0),
                subscriptions: AtomicUsize::new(0),
                discarded: AtomicBool::new(false),
            }),
        }
    }

    /// Make code exchanges return `session`.
    #[must_use]
    pub fn with_exchange_success(self, session: Session) -> Self {
        *lock(&self.inner.exchange_result) = Ok(session);
        self
    }

    /// Make code exchanges fail with `error`.
    #[must_use]
    pub fn with_exchange_failure(self, error: IdentityError) -> Self {
        *lock(&self.inner.exchange_result) = Err(error);
        self
    }

    /// Delay every code exchange.
    #[must_use]
    pub fn with_exchange_delay(self, delay: Duration) -> Self {
        *lock(&self.inner.exchange_delay) = delay;
        self
    }

    /// Set the currently established session.
    #[must_use]
    pub fn with_current_session(self, session: Option<Session>) -> Self {
        self.set_current_session(session);
        self
    }

    /// Make session reads fail with `error`.
    #[must_use]
    pub fn with_read_failure(self, error: IdentityError) -> Self {
        *lock(&self.inner.read_failure) = Some(error);
        self
    }

    /// Deliver `event` to every subscriber as soon as it subscribes.
    #[must_use]
    pub fn with_replay(self, event: SessionEvent) -> Self {
        lock(&self.inner.replay).push(event);
        self
    }

    /// Replace the currently established session.
    pub fn set_current_session(&self, session: Option<Session>) {
        *lock(&self.inner.current_session) = session;
    }

    /// Push a notification to live subscribers.
    ///
    /// Returns the number of subscribers that received it.
    pub fn emit(&self, event: SessionEvent) -> usize {
        self.inner.events.send(event).unwrap_or(0)
    }

    /// Codes passed to the exchange so far.
    #[must_use]
    pub fn exchanged_codes(&self) -> Vec<String> {
        lock(&self.inner.exchanged_codes).clone()
    }

    /// Number of code exchanges.
    #[must_use]
    pub fn exchange_calls(&self) -> usize {
        lock(&self.inner.exchanged_codes).len()
    }

    /// Number of current-session reads.
    #[must_use]
    pub fn session_reads(&self) -> usize {
        self.inner.session_reads.load(Ordering::SeqCst)
    }

    /// Number of subscriptions.
    #[must_use]
    pub fn subscriptions(&self) -> usize {
        self.inner.subscriptions.load(Ordering::SeqCst)
    }

    /// Whether the local session was discarded.
    #[must_use]
    pub fn was_discarded(&self) -> bool {
        self.inner.discarded.load(Ordering::SeqCst)
    }
}

impl Default for MockIdentityBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityBackend for MockIdentityBackend {
    fn subscribe(&self) -> SessionEvents {
        self.inner.subscriptions.fetch_add(1, Ordering::SeqCst);

        let receiver = self.inner.events.subscribe();
        let replay = lock(&self.inner.replay).clone();
        let live = futures::stream::unfold(receiver, |mut receiver| async move {
            loop {
                match receiver.recv().await {
                    Ok(event) => return Some((event, receiver)),
                    Err(RecvError::Lagged(_)) => {},
                    Err(RecvError::Closed) => return None,
                }
            }
        });

        futures::stream::iter(replay).chain(live).boxed()
    }

    fn exchange_code_for_session(
        &self,
        code: &str,
    ) -> impl Future<Output = Result<Session, IdentityError>> + Send {
        let inner = Arc::clone(&self.inner);
        lock(&inner.exchanged_codes).push(code.to_string());

        async move {
            let delay = *lock(&inner.exchange_delay);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            let result = lock(&inner.exchange_result).clone();
            if let Ok(session) = &result {
                *lock(&inner.current_session) = Some(session.clone());
            }
            result
        }
    }

    fn current_session(
        &self,
    ) -> impl Future<Output = Result<Option<Session>, IdentityError>> + Send {
        let inner = Arc::clone(&self.inner);
        inner.session_reads.fetch_add(1, Ordering::SeqCst);

        async move {
            if let Some(error) = lock(&inner.read_failure).clone() {
                return Err(error);
            }
            Ok(lock(&inner.current_session).clone())
        }
    }

    fn discard_local_session(&self) -> impl Future<Output = ()> + Send {
        let inner = Arc::clone(&self.inner);

        async move {
            inner.discarded.store(true, Ordering::SeqCst);
            *lock(&inner.current_session) = None;
            let _ = inner.events.send(SessionEvent::SignedOut);
        }
    }
}
