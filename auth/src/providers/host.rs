//! Host application trait.

use crate::state::Handoff;

/// The application embedding the callback flow.
pub trait Host: Send + Sync {
    /// Replace the address-bar URL without reloading.
    fn replace_url(&self, url: &str);

    /// Receive the completed profile and navigate to its route.
    fn hand_off(&self, handoff: &Handoff);

    /// Navigate to `route`.
    fn navigate(&self, route: &str);
}
