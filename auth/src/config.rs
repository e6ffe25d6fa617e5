//! Callback flow configuration.
//!
//! Values are provided by the application, either through the builder
//! methods or from `LINKGATE_*` environment variables.

use crate::error::ConfigError;
use crate::state::Role;
use std::time::Duration;

/// Environment variable holding the finalization API base URL.
pub const ENV_SERVER_URL: &str = "LINKGATE_SERVER_URL";

/// Environment variable holding the resolution deadline in milliseconds.
pub const ENV_DEADLINE_MS: &str = "LINKGATE_DEADLINE_MS";

/// Environment variable holding the hand-off delay in milliseconds.
pub const ENV_NAVIGATION_DELAY_MS: &str = "LINKGATE_NAVIGATION_DELAY_MS";

/// Landing route for each role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleRoutes {
    /// Route for [`Role::SuperAdmin`].
    pub super_admin: String,
    /// Route for [`Role::TenantAdmin`].
    pub tenant_admin: String,
    /// Route for [`Role::Employee`].
    pub employee: String,
}

impl RoleRoutes {
    /// Route for `role`.
    #[must_use]
    pub fn route(&self, role: Role) -> &str {
        match role {
            Role::SuperAdmin => &self.super_admin,
            Role::TenantAdmin => &self.tenant_admin,
            Role::Employee => &self.employee,
        }
    }
}

impl Default for RoleRoutes {
    fn default() -> Self {
        Self {
            super_admin: "/super-admin".to_string(),
            tenant_admin: "/admin".to_string(),
            employee: "/portal".to_string(),
        }
    }
}

/// Callback flow configuration.
#[derive(Debug, Clone)]
pub struct CallbackConfig {
    /// Base URL of the finalization API (e.g., "https://api.example.com").
    ///
    /// The password is committed to `{server_url}/auth/activate-account`.
    pub server_url: String,

    /// How long the flow may stay in `Loading`.
    ///
    /// Default: 15 seconds
    pub deadline: Duration,

    /// Pause between success and the host hand-off.
    ///
    /// Default: 1.5 seconds
    pub navigation_delay: Duration,

    /// Minimum password length in characters.
    ///
    /// Default: 8
    pub min_password_len: usize,

    /// Route the user returns to after aborting.
    ///
    /// Default: `/login`
    pub login_route: String,

    /// Landing routes by role.
    pub routes: RoleRoutes,

    /// How long a tenant policy flag stays cached.
    ///
    /// Default: 5 minutes
    pub policy_ttl: chrono::Duration,
}

impl CallbackConfig {
    /// Create a configuration for the given finalization API.
    #[must_use]
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            ..Self::default()
        }
    }

    /// Load the configuration from `LINKGATE_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the server URL is missing or a duration
    /// is not a whole number of milliseconds.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load the configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// Same as [`CallbackConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server_url = lookup(ENV_SERVER_URL)
            .filter(|value| !value.trim().is_empty())
            .ok_or(ConfigError::Missing(ENV_SERVER_URL))?;

        let mut config = Self::new(server_url);
        if let Some(deadline) = millis(&lookup, ENV_DEADLINE_MS)? {
            config = config.with_deadline(deadline);
        }
        if let Some(delay) = millis(&lookup, ENV_NAVIGATION_DELAY_MS)? {
            config = config.with_navigation_delay(delay);
        }
        Ok(config)
    }

    /// Set the resolution deadline.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Set the hand-off delay.
    #[must_use]
    pub const fn with_navigation_delay(mut self, delay: Duration) -> Self {
        self.navigation_delay = delay;
        self
    }

    /// Set the minimum password length.
    #[must_use]
    pub const fn with_min_password_len(mut self, len: usize) -> Self {
        self.min_password_len = len;
        self
    }

    /// Set the route used after an abort.
    #[must_use]
    pub fn with_login_route(mut self, route: impl Into<String>) -> Self {
        self.login_route = route.into();
        self
    }

    /// Set the landing routes.
    #[must_use]
    pub fn with_routes(mut self, routes: RoleRoutes) -> Self {
        self.routes = routes;
        self
    }

    /// Set the policy cache TTL.
    #[must_use]
    pub const fn with_policy_ttl(mut self, ttl: chrono::Duration) -> Self {
        self.policy_ttl = ttl;
        self
    }
}

impl Default for CallbackConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:3000".to_string(),
            deadline: Duration::from_secs(15),
            navigation_delay: Duration::from_millis(1500),
            min_password_len: 8,
            login_route: "/login".to_string(),
            routes: RoleRoutes::default(),
            policy_ttl: chrono::Duration::minutes(5),
        }
    }
}

fn millis<F>(lookup: &F, key: &'static str) -> Result<Option<Duration>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| {
            value
                .trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| ConfigError::Invalid { key, value })
        })
        .transpose()
}
