//! Finalization API trait.

use crate::error::CommitError;
use crate::state::Password;
use serde::Serialize;

/// Body of `POST /auth/activate-account`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationRequest {
    /// Subject id of the session.
    pub user_id: String,
    /// New password.
    pub password: Password,
}

/// Successful finalization response.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ActivationResponse {
    /// JSON body returned by the server.
    pub body: serde_json::Value,
}

/// Server-side password commit.
pub trait ActivationApi: Send + Sync {
    /// Set the password for the session's subject and activate the account.
    ///
    /// # Arguments
    ///
    /// - `access_token`: Bearer token of the current session
    /// - `request`: Subject id and password
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The server answers with a non-2xx status → `CommitError::Rejected`
    /// - The request cannot be sent → `CommitError::Transport`
    fn activate_account(
        &self,
        access_token: &str,
        request: &ActivationRequest,
    ) -> impl std::future::Future<Output = Result<ActivationResponse, CommitError>> + Send;
}
