// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent user-facing messages.

use crate::config::ConfigError;

/// Application error type returned by session operations.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Email already registered: {0}")]
    DuplicateEmail(String),

    #[error("Auth service unreachable: {0}")]
    Unreachable(String),

    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Session expired")]
    SessionExpired,

    #[error("Not signed in")]
    NotAuthenticated,

    #[error("Superseded by a newer session change")]
    Superseded,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Text shown inline next to the form that triggered the failed operation.
    pub fn user_message(&self) -> String {
        match self {
            AppError::InvalidCredentials(msg)
            | AppError::Validation(msg)
            | AppError::DuplicateEmail(msg) => msg.clone(),
            AppError::Api { message, .. } if !message.is_empty() => message.clone(),
            AppError::Unreachable(_) => {
                "Could not reach the server. Please try again.".to_string()
            }
            AppError::SessionExpired | AppError::NotAuthenticated => {
                "Please sign in again.".to_string()
            }
            AppError::Superseded => "Your session changed while signing in.".to_string(),
            AppError::Api { .. }
            | AppError::Storage(_)
            | AppError::Config(_)
            | AppError::Internal(_) => "Something went wrong. Please try again.".to_string(),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => msg.to_string(),
                    None => format!("{} is invalid", field),
                })
            })
            .collect();
        messages.sort();
        AppError::Validation(messages.join("; "))
    }
}

/// Result type alias for session operations
pub type Result<T> = std::result::Result<T, AppError>;
