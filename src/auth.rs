//! Authentication
//!
//! Explicit session state plus a client for the hosted auth API
//! (password sign-in and registration).

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::error::{FitzyError, FitzyResult};
use crate::gateway::{check_response, http_client};

/// An authenticated caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    #[serde(skip_serializing)]
    pub access_token: String,
    pub email: Option<String>,
}

impl Session {
    /// Session for the implicit local user; carries no token
    pub fn local(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            access_token: String::new(),
            email: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: AuthUser,
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegistrationOutcome {
    pub email: String,
    pub confirmation_required: bool,
}

/// Client for the hosted auth API
#[derive(Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl AuthClient {
    pub fn new(base_url: &str, api_key: &str) -> FitzyResult<Self> {
        Ok(Self {
            http: http_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Exchange email and password for a session
    pub async fn sign_in(&self, email: &str, password: &str) -> FitzyResult<Session> {
        require_credentials(email, password)?;

        let response = self
            .http
            .post(format!("{}/auth/v1/token", self.base_url))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.api_key)
            .json(&json!({ "email": email.trim(), "password": password }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if body.contains("Email not confirmed") {
                return Err(FitzyError::validation(
                    "Please verify your email before signing in.",
                ));
            }
            return Err(FitzyError::from_status(status.as_u16(), body));
        }

        let token: TokenResponse = response.json().await?;
        info!(user_id = %token.user.id, "signed in");

        Ok(Session {
            user_id: token.user.id,
            access_token: token.access_token,
            email: token.user.email.or_else(|| Some(email.trim().to_string())),
        })
    }

    /// Create an account; the provider sends a confirmation email
    pub async fn sign_up(&self, email: &str, password: &str) -> FitzyResult<RegistrationOutcome> {
        require_credentials(email, password)?;

        let response = self
            .http
            .post(format!("{}/auth/v1/signup", self.base_url))
            .header("apikey", &self.api_key)
            .json(&json!({ "email": email.trim(), "password": password }))
            .send()
            .await?;

        let response = check_response(response).await?;
        let body: serde_json::Value = response.json().await?;
        // An immediate session means the project has email confirmation disabled
        let confirmation_required = body.get("access_token").is_none();
        info!(confirmation_required, "registered account");

        Ok(RegistrationOutcome {
            email: email.trim().to_string(),
            confirmation_required,
        })
    }
}

fn require_credentials(email: &str, password: &str) -> FitzyResult<()> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(FitzyError::validation("Email and password are required"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_sign_in_returns_session() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "password"))
            .and(header("apikey", "anon"))
            .and(body_json(json!({ "email": "ana@example.com", "password": "pw" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "jwt-123",
                "token_type": "bearer",
                "user": { "id": "user-1", "email": "ana@example.com" }
            })))
            .mount(&mock_server)
            .await;

        let client = AuthClient::new(&mock_server.uri(), "anon").unwrap();
        let session = client.sign_in("ana@example.com", "pw").await.unwrap();

        assert_eq!(session.user_id, "user-1");
        assert_eq!(session.access_token, "jwt-123");
        assert_eq!(session.email.as_deref(), Some("ana@example.com"));
    }

    #[tokio::test]
    async fn test_unconfirmed_email_is_a_validation_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_grant",
                "error_description": "Email not confirmed"
            })))
            .mount(&mock_server)
            .await;

        let client = AuthClient::new(&mock_server.uri(), "anon").unwrap();
        let err = client.sign_in("ana@example.com", "pw").await.unwrap_err();

        assert_eq!(err.to_string(), "Please verify your email before signing in.");
    }

    #[tokio::test]
    async fn test_wrong_password_is_bad_request() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(ResponseTemplate::new(400).set_body_string("Invalid login credentials"))
            .mount(&mock_server)
            .await;

        let client = AuthClient::new(&mock_server.uri(), "anon").unwrap();
        let err = client.sign_in("ana@example.com", "nope").await.unwrap_err();

        assert!(matches!(err, FitzyError::BadRequest(body) if body.contains("Invalid login")));
    }

    #[tokio::test]
    async fn test_sign_up_reports_confirmation() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/v1/signup"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "user-2", "email": "bo@example.com"
            })))
            .mount(&mock_server)
            .await;

        let client = AuthClient::new(&mock_server.uri(), "anon").unwrap();
        let outcome = client.sign_up("bo@example.com", "secret").await.unwrap();

        assert!(outcome.confirmation_required);
    }

    #[tokio::test]
    async fn test_missing_credentials_make_no_call() {
        let client = AuthClient::new("http://127.0.0.1:9", "anon").unwrap();
        let err = client.sign_in("  ", "pw").await.unwrap_err();
        assert!(matches!(err, FitzyError::Validation(_)));
    }
}
