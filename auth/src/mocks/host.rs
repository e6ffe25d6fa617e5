//! Mock host application for testing.

use super::lock;
use crate::providers::Host;
use crate::state::Handoff;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct Inner {
    replaced_urls: Mutex<Vec<String>>,
    handoffs: Mutex<Vec<Handoff>>,
    navigations: Mutex<Vec<String>>,
}

/// Mock host.
///
/// Records URL replacements, hand-offs and navigations. A hand-off also
/// counts as a navigation to its route.
#[derive(Debug, Clone, Default)]
pub struct MockHost {
    inner: Arc<Inner>,
}

impl MockHost {
    /// Create a host with nothing recorded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every URL written to the address bar, oldest first.
    #[must_use]
    pub fn replaced_urls(&self) -> Vec<String> {
        lock(&self.inner.replaced_urls).clone()
    }

    /// Last URL written to the address bar.
    #[must_use]
    pub fn visible_url(&self) -> Option<String> {
        lock(&self.inner.replaced_urls).last().cloned()
    }

    /// Hand-offs received.
    #[must_use]
    pub fn handoffs(&self) -> Vec<Handoff> {
        lock(&self.inner.handoffs).clone()
    }

    /// Routes navigated to.
    #[must_use]
    pub fn navigations(&self) -> Vec<String> {
        lock(&self.inner.navigations).clone()
    }
}

impl Host for MockHost {
    fn replace_url(&self, url: &str) {
        lock(&self.inner.replaced_urls).push(url.to_string());
    }

    fn hand_off(&self, handoff: &Handoff) {
        lock(&self.inner.handoffs).push(handoff.clone());
        self.navigate(&handoff.route);
    }

    fn navigate(&self, route: &str) {
        lock(&self.inner.navigations).push(route.to_string());
    }
}
