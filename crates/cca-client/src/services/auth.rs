//! Staff authentication and password recovery.

use cca_domain::{AuthUser, Credentials, LoginResponse};
use reqwest::Method;
use serde::Serialize;
use serde_json::{Value, json};

use crate::error::{ClientError, Result};
use crate::http::ApiClient;

/// `/api/auth/*`
#[derive(Debug, Clone)]
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Log in and store the bearer token.
    ///
    /// When the backend omits the user record, a minimal one carrying the
    /// email is returned.
    ///
    /// # Errors
    ///
    /// `MissingToken` when the response has neither `token` nor `accessToken`.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthUser> {
        let credentials = Credentials {
            email: email.to_string(),
            password: password.to_string(),
        };

        let response: LoginResponse = self
            .client
            .send_json(Method::POST, "/api/auth/login", &credentials)
            .await?;

        let token = response.bearer().ok_or(ClientError::MissingToken)?;
        self.client.tokens().set_token(token)?;

        tracing::info!(email, "Logged in");

        Ok(response.user.unwrap_or_else(|| AuthUser {
            email: email.to_string(),
            ..AuthUser::default()
        }))
    }

    /// Log out. The local token is dropped even if the backend call fails.
    ///
    /// # Errors
    ///
    /// Returns the backend error after the token has been cleared.
    pub async fn logout(&self) -> Result<()> {
        let result: Result<Value> = self
            .client
            .send_json(Method::POST, "/api/auth/logout", &json!({}))
            .await;
        self.client.tokens().clear()?;

        match result {
            Ok(_) => {
                tracing::info!("Logged out");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Logout request failed, local session cleared");
                Err(e)
            }
        }
    }

    /// Current user. An `Unauthorized` response clears the stored token.
    pub async fn me(&self) -> Result<AuthUser> {
        match self.client.get_json("/api/auth/me", &[]).await {
            Err(ClientError::Unauthorized(message)) => {
                tracing::info!("Session rejected by backend, clearing token");
                self.client.tokens().clear()?;
                Err(ClientError::Unauthorized(message))
            }
            other => other,
        }
    }

    /// Ask the backend to email a reset code
    pub async fn forgot_password(&self, email: &str) -> Result<Value> {
        #[derive(Serialize)]
        struct Body<'a> {
            email: &'a str,
        }

        self.client
            .post_json_anonymous("/api/auth/forgot-password", &Body { email })
            .await
    }

    /// Check a reset code before asking for the new password
    pub async fn validate_reset_code(&self, code: &str) -> Result<Value> {
        self.client
            .get_json_anonymous(&self.client.path("/api/auth/validate-reset-code", &[code]))
            .await
    }

    pub async fn reset_password(&self, code: &str, password: &str) -> Result<Value> {
        #[derive(Serialize)]
        struct Body<'a> {
            password: &'a str,
            code: &'a str,
        }

        self.client
            .post_json_anonymous("/api/auth/reset-password", &Body { password, code })
            .await
    }
}
