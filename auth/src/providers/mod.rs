//! Callback flow collaborators.
//!
//! This module defines traits for every external dependency of the callback
//! flow. The reducer depends on these traits only; applications inject
//! concrete implementations through the environment.
//!
//! ```text
//! ┌──────────────────┐   exchange / read / events   ┌──────────────────┐
//! │ CallbackReducer  │ ◀──────────────────────────▶ │ IdentityBackend  │
//! │                  │                              └──────────────────┘
//! │                  │   POST /auth/activate-account┌──────────────────┐
//! │                  │ ───────────────────────────▶ │ ActivationApi    │
//! │                  │                              └──────────────────┘
//! │                  │   profile lookup             ┌──────────────────┐
//! │                  │ ───────────────────────────▶ │ ProfileDirectory │
//! │                  │                              └──────────────────┘
//! │                  │   tenant MFA flag            ┌──────────────────┐
//! │                  │ ───────────────────────────▶ │ PolicyProvider   │
//! │                  │                              └──────────────────┘
//! │                  │   URL bar / hand-off         ┌──────────────────┐
//! │                  │ ───────────────────────────▶ │ Host             │
//! └──────────────────┘                              └──────────────────┘
//! ```
//!
//! Only [`ActivationApi`] ships with a production implementation
//! ([`HttpActivationApi`]); the others belong to the embedding application.

pub mod activation;
pub mod host;
pub mod http;
pub mod identity;
pub mod policy;
pub mod profiles;

pub use activation::{ActivationApi, ActivationRequest, ActivationResponse};
pub use host::Host;
pub use http::HttpActivationApi;
pub use identity::{IdentityBackend, SessionEvent, SessionEvents};
pub use policy::PolicyProvider;
pub use profiles::ProfileDirectory;
