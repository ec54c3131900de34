// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! CourseHub auth API client.
//!
//! Handles:
//! - Email/password login and registration
//! - Google ID token exchange
//! - Best-effort server-side logout
//! - Profile fetch and password reset requests

use crate::config::Config;
use crate::error::AppError;
use crate::models::auth::{ApiErrorBody, Envelope};
use crate::models::{AuthResponse, GoogleLoginRequest, LoginRequest, RegisterRequest, User};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Remote authentication collaborator.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, AppError>;

    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, AppError>;

    async fn google_login(&self, request: &GoogleLoginRequest) -> Result<AuthResponse, AppError>;

    /// Invalidate the session server-side.
    async fn logout(&self, token: &str) -> Result<(), AppError>;

    async fn current_user(&self, token: &str) -> Result<User, AppError>;

    async fn forgot_password(&self, email: &str) -> Result<(), AppError>;

    async fn reset_password(&self, reset_token: &str, password: &str) -> Result<(), AppError>;
}

/// Which endpoint an error came from; decides how 4xx responses are classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    Login,
    Register,
    Other,
}

/// HTTP implementation of [`AuthApi`].
#[derive(Clone)]
pub struct HttpAuthApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpAuthApi {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("HTTP client build failed: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST a JSON body and parse the (possibly enveloped) JSON response.
    async fn post_json<B, T>(
        &self,
        path: &str,
        body: &B,
        endpoint: Endpoint,
    ) -> Result<T, AppError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .http
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::Unreachable(e.to_string()))?;

        check_response_json(response, endpoint).await
    }

    /// POST a JSON body, ignoring any response body.
    async fn post_empty<B>(&self, path: &str, body: &B) -> Result<(), AppError>
    where
        B: Serialize + ?Sized + Sync,
    {
        let response = self
            .http
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::Unreachable(e.to_string()))?;

        check_response(response, Endpoint::Other).await
    }
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, AppError> {
        self.post_json("/auth/login", request, Endpoint::Login).await
    }

    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, AppError> {
        self.post_json("/auth/register", request, Endpoint::Register)
            .await
    }

    async fn google_login(&self, request: &GoogleLoginRequest) -> Result<AuthResponse, AppError> {
        self.post_json("/auth/oauth2/google", request, Endpoint::Login)
            .await
    }

    async fn logout(&self, token: &str) -> Result<(), AppError> {
        let response = self
            .http
            .post(self.url("/auth/logout"))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AppError::Unreachable(e.to_string()))?;

        check_response(response, Endpoint::Other).await
    }

    async fn current_user(&self, token: &str) -> Result<User, AppError> {
        let response = self
            .http
            .get(self.url("/auth/me"))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AppError::Unreachable(e.to_string()))?;

        check_response_json(response, Endpoint::Other).await
    }

    async fn forgot_password(&self, email: &str) -> Result<(), AppError> {
        self.post_empty(
            "/auth/forgot-password",
            &serde_json::json!({ "email": email }),
        )
        .await
    }

    async fn reset_password(&self, reset_token: &str, password: &str) -> Result<(), AppError> {
        self.post_empty(
            "/auth/reset-password",
            &serde_json::json!({ "token": reset_token, "password": password }),
        )
        .await
    }
}

/// Check response status and return error if not successful.
async fn check_response(response: reqwest::Response, endpoint: Endpoint) -> Result<(), AppError> {
    if response.status().is_success() {
        return Ok(());
    }
    Err(error_from_response(response, endpoint).await)
}

/// Check response and parse JSON body.
async fn check_response_json<T: DeserializeOwned>(
    response: reqwest::Response,
    endpoint: Endpoint,
) -> Result<T, AppError> {
    if !response.status().is_success() {
        return Err(error_from_response(response, endpoint).await);
    }

    let body = response
        .text()
        .await
        .map_err(|e| AppError::Unreachable(format!("Failed to read response: {}", e)))?;

    serde_json::from_str::<Envelope<T>>(&body)
        .map(Envelope::into_inner)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Unexpected response body: {}", e)))
}

async fn error_from_response(response: reqwest::Response, endpoint: Endpoint) -> AppError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let parsed: ApiErrorBody = serde_json::from_str(&body).unwrap_or_default();
    let message = parsed
        .message
        .or(parsed.error)
        .filter(|m| !m.trim().is_empty());

    classify_error(status, message, endpoint)
}

fn classify_error(status: StatusCode, message: Option<String>, endpoint: Endpoint) -> AppError {
    let mentions_duplicate = message
        .as_deref()
        .map(|m| m.to_ascii_lowercase().contains("already"))
        .unwrap_or(false);

    match (endpoint, status) {
        (Endpoint::Register, StatusCode::CONFLICT) => AppError::DuplicateEmail(
            message.unwrap_or_else(|| "Email already in use".to_string()),
        ),
        (Endpoint::Register, _) if mentions_duplicate => {
            AppError::DuplicateEmail(message.unwrap_or_default())
        }
        (Endpoint::Register, s) if s.is_client_error() => AppError::Validation(
            message.unwrap_or_else(|| "Registration details are invalid".to_string()),
        ),
        (Endpoint::Login, s) if s.is_client_error() => AppError::InvalidCredentials(
            message.unwrap_or_else(|| "Invalid credentials".to_string()),
        ),
        (_, StatusCode::UNAUTHORIZED) => AppError::SessionExpired,
        (_, s) if s.is_server_error() && endpoint == Endpoint::Login => {
            // The user service reports bad credentials as a 500 with a message.
            match message {
                Some(m) if m.to_ascii_lowercase().contains("invalid credentials") => {
                    AppError::InvalidCredentials(m)
                }
                other => AppError::Api {
                    status: s.as_u16(),
                    message: other.unwrap_or_default(),
                },
            }
        }
        (_, s) => AppError::Api {
            status: s.as_u16(),
            message: message.unwrap_or_default(),
        },
    }
}
