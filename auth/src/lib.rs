//! # Linkgate Auth
//!
//! Resolves invite and password-recovery links into a password-setup flow.
//!
//! A user arrives at the callback page from an emailed link. The link may
//! carry a one-time code, an error fragment or nothing at all, while the
//! identity backend announces sessions on its own schedule. This crate turns
//! all of those signals into actions for a single reducer, which decides the
//! phase of the flow exactly once.
//!
//! ## Architecture
//!
//! ```text
//! Mounted(url) ─► classify ─┬─► code exchange ──────┐
//!                           ├─► error fragment ─────┤
//!                           └─► session poll ───────┤
//!          backend notifications ───────────────────┼─► CallbackReducer ─► Phase
//!          deadline timer ──────────────────────────┘
//! ```
//!
//! Phases move `Loading → SetPassword → Success`, or end in `Expired`,
//! `Error` or `Cancelled`. Terminal phases never change again.
//!
//! ## Example
//!
//! ```rust,ignore
//! use linkgate_auth::*;
//!
//! let flow = CallbackFlow::mount(url, CallbackConfig::from_env()?, env).await?;
//! let phase = flow
//!     .wait_for_phase(|phase| *phase != Phase::Loading, Duration::from_secs(20))
//!     .await?;
//!
//! if phase == Phase::SetPassword {
//!     flow.submit_password("correct-horse", "correct-horse").await?;
//! }
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

pub mod actions;
pub mod commit;
pub mod config;
pub mod constants;
pub mod environment;
pub mod error;
pub mod exchange;
pub mod flow;
pub mod fragment;
pub mod link;
pub mod listener;
pub mod policy;
pub mod profile;
pub mod providers;
pub mod reducers;
pub mod state;

#[cfg(feature = "test-utils")]
pub mod mocks;

pub use actions::CallbackAction;
pub use config::{CallbackConfig, RoleRoutes};
pub use environment::CallbackEnvironment;
pub use error::{
    CommitError, ConfigError, FailureKind, IdentityError, LinkError, ProviderError,
    ValidationError,
};
pub use flow::{CallbackFlow, CallbackStore};
pub use policy::PolicyCache;
pub use reducers::CallbackReducer;
pub use state::{
    CallbackState, FlowLabel, Handoff, Password, Phase, ResolutionSource, Role, Session,
    UserProfile,
};
