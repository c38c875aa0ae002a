//! reqwest implementation of the backend endpoints.

use std::time::Duration;

use anyhow::{Context, Result};
use eportal_types::{
    ApiEnvelope, CurrentUser, ForgotPasswordRequest, LoginData, LoginRequest, RegisterRequest,
    UpdateProfileRequest,
};
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{AuthBackend, AuthError, AuthResult};
use crate::config::ApiConfig;

/// Standard User-Agent header for eportal requests.
pub const USER_AGENT: &str = concat!("eportal/", env!("CARGO_PKG_VERSION"));

const LOGIN_PATH: &str = "/api/auth/login";
const FORGOT_PASSWORD_PATH: &str = "/api/auth/forgot-password";
const REGISTER_PATH: &str = "/api/auth/register";
const CURRENT_USER_PATH: &str = "/api/auth/me";
const UPDATE_PROFILE_PATH: &str = "/api/auth/update-profile";

const DEFAULT_RESET_MESSAGE: &str =
    "Password reset instructions have been sent. Please check your e-mail.";
const DEFAULT_REGISTER_MESSAGE: &str = "Registration completed. You can now log in.";
const DEFAULT_PROFILE_MESSAGE: &str = "Your settings have been updated.";

/// Backend client over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: String,
    http: reqwest::Client,
}

impl HttpBackend {
    /// Creates a client for `base_url` (no trailing slash).
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built (e.g. TLS init).
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("Failed to build HTTP client")?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Creates a client from the `[api]` config section.
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid or the client cannot be built.
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        Self::new(config.resolved_base_url()?, config.timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> AuthResult<ApiEnvelope<T>>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .http
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| {
                debug!(path, error = %e, "backend request failed");
                AuthError::from_transport(&e)
            })?;
        read_envelope(path, response).await
    }
}

async fn read_envelope<T: DeserializeOwned>(
    path: &str,
    response: reqwest::Response,
) -> AuthResult<ApiEnvelope<T>> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| AuthError::from_transport(&e))?;
    debug!(path, status = status.as_u16(), "backend responded");

    if !status.is_success() {
        return Err(AuthError::from_status(status.as_u16(), &body));
    }

    let envelope: ApiEnvelope<T> = serde_json::from_str(&body)
        .map_err(|e| AuthError::Unexpected(format!("Malformed response from {path}: {e}")))?;

    if envelope.is_success() {
        Ok(envelope)
    } else {
        match envelope.message {
            Some(message) if !message.trim().is_empty() => Err(AuthError::Rejected {
                status: status.as_u16(),
                message,
            }),
            _ => Err(AuthError::Unexpected(format!(
                "{path} reported an error without a message"
            ))),
        }
    }
}

impl AuthBackend for HttpBackend {
    fn login<'a>(&'a self, request: &'a LoginRequest) -> BoxFuture<'a, AuthResult<LoginData>> {
        async move {
            let envelope: ApiEnvelope<LoginData> = self.post_json(LOGIN_PATH, request).await?;
            envelope
                .data
                .ok_or_else(|| AuthError::Unexpected("Login response without data".to_string()))
        }
        .boxed()
    }

    fn forgot_password<'a>(
        &'a self,
        request: &'a ForgotPasswordRequest,
    ) -> BoxFuture<'a, AuthResult<String>> {
        async move {
            let envelope: ApiEnvelope<serde_json::Value> =
                self.post_json(FORGOT_PASSWORD_PATH, request).await?;
            Ok(envelope
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_RESET_MESSAGE.to_string()))
        }
        .boxed()
    }

    fn register<'a>(&'a self, request: &'a RegisterRequest) -> BoxFuture<'a, AuthResult<String>> {
        async move {
            let envelope: ApiEnvelope<serde_json::Value> =
                self.post_json(REGISTER_PATH, request).await?;
            Ok(envelope
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_REGISTER_MESSAGE.to_string()))
        }
        .boxed()
    }

    fn current_user<'a>(&'a self, token: &'a str) -> BoxFuture<'a, AuthResult<CurrentUser>> {
        async move {
            let response = self
                .http
                .get(self.url(CURRENT_USER_PATH))
                .bearer_auth(token)
                .send()
                .await
                .map_err(|e| AuthError::from_transport(&e))?;
            let envelope: ApiEnvelope<CurrentUser> =
                read_envelope(CURRENT_USER_PATH, response).await?;
            envelope.data.ok_or_else(|| {
                AuthError::Unexpected("Current user response without data".to_string())
            })
        }
        .boxed()
    }

    fn update_profile<'a>(
        &'a self,
        token: &'a str,
        request: &'a UpdateProfileRequest,
    ) -> BoxFuture<'a, AuthResult<String>> {
        async move {
            let response = self
                .http
                .put(self.url(UPDATE_PROFILE_PATH))
                .bearer_auth(token)
                .json(request)
                .send()
                .await
                .map_err(|e| {
                    debug!(path = UPDATE_PROFILE_PATH, error = %e, "backend request failed");
                    AuthError::from_transport(&e)
                })?;
            let envelope: ApiEnvelope<serde_json::Value> =
                read_envelope(UPDATE_PROFILE_PATH, response).await?;
            Ok(envelope
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_PROFILE_MESSAGE.to_string()))
        }
        .boxed()
    }
}
