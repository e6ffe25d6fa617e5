//! Declarative macros for ergonomic effect construction
//!
//! These macros reduce boilerplate when creating `Effect` variants inside
//! reducers.

/// Create an `Effect::Future` from an async block
///
/// # Example
///
/// ```rust,ignore
/// use linkgate_core::async_effect;
///
/// async_effect! {
///     let session = identity.current_session().await.ok().flatten();
///     Some(CallbackAction::SessionRead { session })
/// }
/// ```
#[macro_export]
macro_rules! async_effect {
    ($($body:tt)*) => {
        $crate::effect::Effect::Future(
            ::std::boxed::Box::pin(async move { $($body)* })
        )
    };
}

/// Create an `Effect::Delay` for scheduling delayed actions
///
/// # Example
///
/// ```rust,ignore
/// use linkgate_core::delay;
/// use std::time::Duration;
///
/// delay! {
///     duration: Duration::from_secs(15),
///     action: CallbackAction::DeadlineElapsed
/// }
/// ```
#[macro_export]
macro_rules! delay {
    (
        duration: $duration:expr,
        action: $action:expr
    ) => {
        $crate::effect::Effect::Delay {
            duration: $duration,
            action: ::std::boxed::Box::new($action),
        }
    };
}

/// Create an `Effect::Cancellable` wrapping another effect
///
/// # Example
///
/// ```rust,ignore
/// use linkgate_core::{cancellable, delay};
///
/// cancellable! {
///     id: DEADLINE,
///     effect: delay! { duration: deadline, action: CallbackAction::DeadlineElapsed }
/// }
/// ```
#[macro_export]
macro_rules! cancellable {
    (
        id: $id:expr,
        effect: $effect:expr
    ) => {
        $crate::effect::Effect::Cancellable {
            id: $id,
            effect: ::std::boxed::Box::new($effect),
        }
    };
}
