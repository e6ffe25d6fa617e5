//! Identity-backend notifications as callback actions.
//!
//! The listener is flow-agnostic: it translates notifications and leaves
//! every decision to the reducer.

use crate::actions::CallbackAction;
use crate::providers::{SessionEvent, SessionEvents};
use futures::{Stream, StreamExt};

/// Translate one notification. Irrelevant notifications yield `None`.
#[must_use]
pub fn to_action(event: SessionEvent) -> Option<CallbackAction> {
    match event {
        SessionEvent::InitialSession(Some(session)) | SessionEvent::SignedIn(session) => {
            Some(CallbackAction::SessionEstablished { session })
        },
        SessionEvent::PasswordRecovery(session) => {
            Some(CallbackAction::RecoveryModeEntered { session })
        },
        SessionEvent::UserUpdated(Some(session)) => {
            Some(CallbackAction::ProfileUpdated { session })
        },
        SessionEvent::InitialSession(None)
        | SessionEvent::UserUpdated(None)
        | SessionEvent::SignedOut
        | SessionEvent::TokenRefreshed(_) => None,
    }
}

/// Turn a subscription into a stream of actions.
pub fn listen(events: SessionEvents) -> impl Stream<Item = CallbackAction> + Send {
    events.filter_map(|event| {
        tracing::trace!(?event, "Session event");
        futures::future::ready(to_action(event))
    })
}
