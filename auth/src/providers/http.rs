//! HTTP implementation of the finalization API.

use crate::config::CallbackConfig;
use crate::constants::{ACTIVATE_ACCOUNT_PATH, messages};
use crate::error::CommitError;
use crate::providers::activation::{ActivationApi, ActivationRequest, ActivationResponse};
use reqwest::Client;
use std::future::Future;

/// Finalization API client backed by `reqwest`.
///
/// Sends `POST {server_url}/auth/activate-account` with the session's bearer
/// token and a JSON body `{ "userId": .., "password": .. }`.
#[derive(Debug, Clone)]
pub struct HttpActivationApi {
    client: Client,
    endpoint: String,
}

impl HttpActivationApi {
    /// Create a client for the given server.
    #[must_use]
    pub fn new(server_url: &str) -> Self {
        Self::with_client(Client::new(), server_url)
    }

    /// Create a client reusing an existing `reqwest::Client`.
    #[must_use]
    pub fn with_client(client: Client, server_url: &str) -> Self {
        Self {
            client,
            endpoint: format!(
                "{}{ACTIVATE_ACCOUNT_PATH}",
                server_url.trim_end_matches('/')
            ),
        }
    }

    /// Create a client for the configured server.
    #[must_use]
    pub fn from_config(config: &CallbackConfig) -> Self {
        Self::new(&config.server_url)
    }

    /// Full URL of the finalization endpoint.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl ActivationApi for HttpActivationApi {
    fn activate_account(
        &self,
        access_token: &str,
        request: &ActivationRequest,
    ) -> impl Future<Output = Result<ActivationResponse, CommitError>> + Send {
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();
        let access_token = access_token.to_string();
        let request = request.clone();

        async move {
            let response = client
                .post(&endpoint)
                .bearer_auth(&access_token)
                .json(&request)
                .send()
                .await
                .map_err(|e| CommitError::Transport(e.to_string()))?;

            let status = response.status();
            let body = response
                .json::<serde_json::Value>()
                .await
                .unwrap_or(serde_json::Value::Null);

            if status.is_success() {
                tracing::debug!(status = status.as_u16(), "Account activated");
                Ok(ActivationResponse { body })
            } else {
                tracing::warn!(status = status.as_u16(), "Account activation rejected");
                Err(CommitError::Rejected {
                    status: status.as_u16(),
                    message: rejection_message(&body),
                })
            }
        }
    }
}

/// Human-readable message from a failure body: `error`, then `message`.
fn rejection_message(body: &serde_json::Value) -> String {
    ["error", "message"]
        .into_iter()
        .filter_map(|field| body.get(field).and_then(serde_json::Value::as_str))
        .map(str::trim)
        .find(|message| !message.is_empty())
        .unwrap_or(messages::COMMIT_FAILED)
        .to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::state::Password;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> ActivationRequest {
        ActivationRequest {
            user_id: "user-42".to_string(),
            password: Password::new("correct-horse"),
        }
    }

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let api = HttpActivationApi::new("https://api.example.com/");
        assert_eq!(
            api.endpoint(),
            "https://api.example.com/auth/activate-account"
        );
    }

    #[test]
    fn test_request_body_uses_camel_case() {
        let body = serde_json::to_value(request()).unwrap();
        assert_eq!(body, json!({ "userId": "user-42", "password": "correct-horse" }));
    }

    #[tokio::test]
    async fn test_success_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/activate-account"))
            .and(header("authorization", "Bearer token-abc"))
            .and(body_json(json!({ "userId": "user-42", "password": "correct-horse" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
            .expect(1)
            .mount(&server)
            .await;

        let api = HttpActivationApi::new(&server.uri());
        let response = api.activate_account("token-abc", &request()).await.unwrap();

        assert_eq!(response.body, json!({ "success": true }));
    }

    #[tokio::test]
    async fn test_error_field_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/activate-account"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({ "error": "Password is too weak" })),
            )
            .mount(&server)
            .await;

        let api = HttpActivationApi::new(&server.uri());
        let error = api.activate_account("token-abc", &request()).await.unwrap_err();

        assert_eq!(
            error,
            CommitError::Rejected {
                status: 400,
                message: "Password is too weak".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_message_field_is_used_when_error_is_absent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(403).set_body_json(json!({ "message": "User not invited" })),
            )
            .mount(&server)
            .await;

        let api = HttpActivationApi::new(&server.uri());
        let error = api.activate_account("token-abc", &request()).await.unwrap_err();

        assert_eq!(error.user_message(), "User not invited");
    }

    #[tokio::test]
    async fn test_non_json_failure_falls_back_to_generic_copy() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&server)
            .await;

        let api = HttpActivationApi::new(&server.uri());
        let error = api.activate_account("token-abc", &request()).await.unwrap_err();

        assert!(matches!(error, CommitError::Rejected { status: 502, .. }));
        assert_eq!(error.user_message(), messages::COMMIT_FAILED);
    }

    #[tokio::test]
    async fn test_unreachable_server_is_a_transport_error() {
        let api = HttpActivationApi::new("http://127.0.0.1:1");
        let error = api.activate_account("token-abc", &request()).await.unwrap_err();

        assert!(matches!(error, CommitError::Transport(_)));
    }
}
