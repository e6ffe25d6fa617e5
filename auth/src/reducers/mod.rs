//! Callback reducers.
//!
//! Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`.

pub mod callback;

pub use callback::CallbackReducer;
