//! GraphQL client for the Relay Todo API.
//!
//! This module provides the `Authenticator` seam used by the login flow and
//! `ApiClient`, its reqwest-backed implementation.

use std::time::Duration;

use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::auth::{Credentials, Session, User};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Default HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Login mutation, selecting the profile, the token and the error message.
const AUTH_USER_MUTATION: &str = "mutation LoginPage_authMutation($input: AuthUserInput!) {
  AuthUserMutation(input: $input) {
    me {
      id
      username
      email
    }
    token
    error
  }
}";

// ============================================================================
// Outcome
// ============================================================================

/// Result of a completed authentication request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// Token and profile issued
    Authenticated(Session),
    /// The server refused the credentials with a message
    Rejected(String),
    /// Neither a usable session nor an error came back
    Incomplete,
}

/// Anything that can exchange credentials for a session.
#[allow(async_fn_in_trait)]
pub trait Authenticator {
    async fn authenticate(&self, credentials: &Credentials) -> Result<AuthOutcome, ApiError>;
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct GraphQlRequest<'a, V> {
    query: &'a str,
    variables: V,
}

#[derive(Debug, Serialize)]
struct AuthVariables<'a> {
    input: &'a Credentials,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct AuthUserMutationData {
    #[serde(rename = "AuthUserMutation")]
    auth_user_mutation: Option<AuthUserPayload>,
}

#[derive(Debug, Default, Deserialize)]
struct AuthUserPayload {
    me: Option<User>,
    token: Option<String>,
    error: Option<String>,
}

impl AuthUserPayload {
    /// The error is checked first; a token needs a profile to be usable.
    fn into_outcome(self) -> AuthOutcome {
        if let Some(error) = self.error.filter(|e| !e.is_empty()) {
            return AuthOutcome::Rejected(error);
        }
        match (self.token.filter(|t| !t.is_empty()), self.me) {
            (Some(token), Some(user)) => AuthOutcome::Authenticated(Session { token, user }),
            (Some(_), None) => {
                warn!("Token returned without a user profile");
                AuthOutcome::Incomplete
            }
            (None, _) => AuthOutcome::Incomplete,
        }
    }
}

// ============================================================================
// Client
// ============================================================================

/// GraphQL API client.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    api_url: String,
}

impl ApiClient {
    /// Create a new API client for the given GraphQL endpoint
    pub fn new(api_url: impl Into<String>, timeout_secs: u64) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_url: api_url.into(),
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn send_auth_mutation(
        &self,
        credentials: &Credentials,
    ) -> Result<GraphQlResponse<AuthUserMutationData>, ApiError> {
        let body = GraphQlRequest {
            query: AUTH_USER_MUTATION,
            variables: AuthVariables { input: credentials },
        };

        let response = self
            .client
            .post(&self.api_url)
            .header(header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse auth response: {}", e)))
    }

    /// Send the login mutation and interpret its payload.
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthOutcome, ApiError> {
        debug!(email = %credentials.email, url = %self.api_url, "Sending auth mutation");

        let response = self.send_auth_mutation(credentials).await?;

        let payload = response.data.and_then(|d| d.auth_user_mutation);
        let outcome = match payload {
            Some(payload) => payload.into_outcome(),
            None if !response.errors.is_empty() => {
                let messages: Vec<String> =
                    response.errors.into_iter().map(|e| e.message).collect();
                return Err(ApiError::GraphQl(messages.join("; ")));
            }
            None => AuthOutcome::Incomplete,
        };

        match &outcome {
            AuthOutcome::Authenticated(session) => {
                info!(user_id = %session.user.id, "Authentication succeeded")
            }
            AuthOutcome::Rejected(message) => info!(%message, "Authentication rejected"),
            AuthOutcome::Incomplete => warn!("Authentication returned no token and no error"),
        }
        Ok(outcome)
    }
}

impl Authenticator for ApiClient {
    async fn authenticate(&self, credentials: &Credentials) -> Result<AuthOutcome, ApiError> {
        self.login(credentials).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(json: &str) -> AuthUserPayload {
        serde_json::from_str(json).expect("Failed to parse payload test JSON")
    }

    #[test]
    fn test_payload_success() {
        let outcome = payload(
            r#"{"me":{"id":"1","username":"ana","email":"a@a.com"},"token":"t1","error":null}"#,
        )
        .into_outcome();
        let session = match outcome {
            AuthOutcome::Authenticated(session) => session,
            other => panic!("expected Authenticated, got {:?}", other),
        };
        assert_eq!(session.token, "t1");
        assert_eq!(session.user.username, "ana");
    }

    #[test]
    fn test_payload_error_wins_over_token() {
        let outcome = payload(
            r#"{"me":{"id":"1","username":"ana","email":"a@a.com"},"token":"t1","error":"Invalid credentials"}"#,
        )
        .into_outcome();
        assert_eq!(outcome, AuthOutcome::Rejected("Invalid credentials".to_string()));
    }

    #[test]
    fn test_payload_neither_is_incomplete() {
        assert_eq!(payload(r#"{"me":null,"token":null,"error":null}"#).into_outcome(), AuthOutcome::Incomplete);
        assert_eq!(payload("{}").into_outcome(), AuthOutcome::Incomplete);
        assert_eq!(payload(r#"{"token":"","error":""}"#).into_outcome(), AuthOutcome::Incomplete);
    }

    #[test]
    fn test_payload_token_without_profile_is_incomplete() {
        assert_eq!(payload(r#"{"token":"t1"}"#).into_outcome(), AuthOutcome::Incomplete);
    }

    #[test]
    fn test_request_body_shape() {
        let credentials = Credentials::new("a@a.com", "secret");
        let body = GraphQlRequest {
            query: AUTH_USER_MUTATION,
            variables: AuthVariables { input: &credentials },
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["variables"]["input"]["email"], "a@a.com");
        assert_eq!(value["variables"]["input"]["password"], "secret");
        assert!(value["query"].as_str().unwrap().contains("AuthUserMutation(input: $input)"));
    }
}
