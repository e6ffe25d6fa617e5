//! Profile and landing-route derivation for the completion hand-off.

use crate::config::RoleRoutes;
use crate::providers::ProfileDirectory;
use crate::state::{Session, UserProfile};

/// Profile built from session metadata alone.
#[must_use]
pub fn from_session(session: &Session) -> UserProfile {
    let metadata = &session.user.metadata;
    UserProfile {
        id: session.user.id.clone(),
        email: session.user.email.clone().unwrap_or_default(),
        full_name: metadata.full_name.clone(),
        role: metadata.role.unwrap_or_default(),
        tenant_id: metadata.tenant_id.clone(),
    }
}

/// Load the stored profile, falling back to session metadata.
///
/// Missing fields of a stored profile are filled from the session, so the
/// host always receives a fully populated profile.
pub async fn build_profile<P: ProfileDirectory>(directory: &P, session: &Session) -> UserProfile {
    let fallback = from_session(session);

    match directory.fetch_profile(&session.user.id).await {
        Ok(Some(stored)) => merge(stored, fallback),
        Ok(None) => {
            tracing::debug!(user_id = %session.user.id, "No stored profile, using session metadata");
            fallback
        },
        Err(error) => {
            tracing::warn!(user_id = %session.user.id, error = %error, "Profile lookup failed, using session metadata");
            fallback
        },
    }
}

fn merge(stored: UserProfile, fallback: UserProfile) -> UserProfile {
    UserProfile {
        email: if stored.email.is_empty() {
            fallback.email
        } else {
            stored.email
        },
        full_name: stored.full_name.or(fallback.full_name),
        tenant_id: stored.tenant_id.or(fallback.tenant_id),
        ..stored
    }
}

/// Landing route for `profile`.
#[must_use]
pub fn route_for(profile: &UserProfile, routes: &RoleRoutes) -> String {
    routes.route(profile.role).to_string()
}

/// Route through the MFA step, continuing to `next` afterwards.
#[must_use]
pub fn mfa_route(next: &str) -> String {
    format!("/auth/mfa?next={}", urlencoding::encode(next))
}
