//! Account endpoints under `/auth`.

use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use tracing::info;

use super::client::{send, send_unit, ApiClient};
use crate::models::{Credentials, Signup, UserProfile};
use crate::session::AuthVerifier;
use crate::{ClientError, Result};

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(rename = "authToken")]
    auth_token: String,
}

impl ApiClient {
    /// Create an account. Logging in is a separate step.
    pub async fn signup(&self, account: &Signup) -> Result<()> {
        if account.email.trim().is_empty() || account.password.is_empty() {
            return Err(ClientError::Validation(
                "Email and password are required".into(),
            ));
        }
        send_unit(self.anonymous(Method::POST, "/auth/signup").json(account)).await?;
        info!(email = %account.email, "account created");
        Ok(())
    }

    /// Exchange credentials for a bearer token.
    pub async fn login(&self, credentials: &Credentials) -> Result<String> {
        let resp: LoginResponse =
            send(self.anonymous(Method::POST, "/auth/login").json(credentials)).await?;
        if resp.auth_token.is_empty() {
            return Err(ClientError::Unauthorized("server returned an empty token".into()));
        }
        Ok(resp.auth_token)
    }

    /// Resolve `token` to the user it belongs to.
    pub async fn verify_token(&self, token: &str) -> Result<UserProfile> {
        send(self.anonymous(Method::GET, "/auth/verify").bearer_auth(token)).await
    }
}

#[async_trait]
impl AuthVerifier for ApiClient {
    async fn verify(&self, token: &str) -> Result<UserProfile> {
        self.verify_token(token).await
    }
}
