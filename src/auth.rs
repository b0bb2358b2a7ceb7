//! Remote auth service.
//!
//! The service issues Cognito-style tokens. Their contents are opaque here: the
//! client only moves them between the auth service, the token store, and
//! outgoing requests.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::client::{build_http_client, handle_response};
use crate::config::{trim_base, ClientConfig};
use crate::error::{ApiError, Result};

/// Tokens returned by a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokens {
    pub id_token: String,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Deserialize)]
struct JwtToken {
    #[serde(rename = "jwtToken")]
    jwt_token: String,
}

#[derive(Deserialize)]
struct RefreshToken {
    token: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResult {
    id_token: JwtToken,
    access_token: JwtToken,
    refresh_token: RefreshToken,
}

#[derive(Deserialize)]
struct LoginResponse {
    #[serde(default)]
    success: bool,
    result: Option<LoginResult>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl LoginResponse {
    fn into_tokens(self) -> Result<AuthTokens> {
        match (self.success, self.result) {
            (true, Some(result)) => Ok(AuthTokens {
                id_token: result.id_token.jwt_token,
                access_token: result.access_token.jwt_token,
                refresh_token: result.refresh_token.token,
            }),
            _ => Err(ApiError::Auth(
                self.error
                    .or(self.message)
                    .unwrap_or_else(|| "login rejected".to_string()),
            )),
        }
    }
}

pub struct AuthClient {
    base_url: String,
    client: Client,
}

impl AuthClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Ok(Self {
            base_url: trim_base(&config.auth_base_url).to_string(),
            client: build_http_client(None, config.timeout_secs)?,
        })
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        let url = format!("{}/{}", self.base_url, path);
        tracing::debug!(%url, "auth request");
        let response = self.client.post(&url).json(body).send().await?;
        handle_response(response).await
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<AuthTokens> {
        let payload = self
            .post("login", &json!({ "username": username, "password": password }))
            .await?;
        let response: LoginResponse = serde_json::from_value(payload)?;
        response.into_tokens()
    }

    /// Register an account. The response is passed through untouched.
    pub async fn signup(&self, username: &str, email: &str, password: &str) -> Result<Value> {
        self.post(
            "signup",
            &json!({ "username": username, "email": email, "password": password }),
        )
        .await
    }

    pub async fn logout(&self, refresh_token: &str) -> Result<()> {
        self.post("logout", &json!({ "refresh_token": refresh_token }))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> AuthClient {
        AuthClient::new(&ClientConfig {
            auth_base_url: format!("{}/auth/", server.uri()),
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn login_extracts_tokens() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(body_json(json!({"username": "ana", "password": "pw"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "result": {
                    "idToken": {"jwtToken": "id.jwt"},
                    "accessToken": {"jwtToken": "access.jwt"},
                    "refreshToken": {"token": "refresh"}
                }
            })))
            .mount(&server)
            .await;

        let tokens = client(&server).login("ana", "pw").await.unwrap();
        assert_eq!(
            tokens,
            AuthTokens {
                id_token: "id.jwt".into(),
                access_token: "access.jwt".into(),
                refresh_token: "refresh".into(),
            }
        );
    }

    #[tokio::test]
    async fn unsuccessful_login_is_an_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"success": false, "message": "Incorrect username or password."})),
            )
            .mount(&server)
            .await;

        let err = client(&server).login("ana", "bad").await.unwrap_err();
        assert_eq!(err.to_string(), "Authentication failed: Incorrect username or password.");
    }

    #[tokio::test]
    async fn logout_sends_snake_case_refresh_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/logout"))
            .and(body_json(json!({"refresh_token": "r1"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        client(&server).logout("r1").await.unwrap();
    }
}
