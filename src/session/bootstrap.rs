// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session restore from durable storage at startup.

use super::state::{Credentials, Session};
use crate::models::User;
use crate::storage::{keys, DurableStorage};

/// Stored user record that no longer parses.
#[derive(Debug, thiserror::Error)]
#[error("corrupt session data: {0}")]
struct CorruptSessionData(#[from] serde_json::Error);

fn parse_user(raw: &str) -> Result<User, CorruptSessionData> {
    Ok(serde_json::from_str(raw)?)
}

/// Rebuild the session from the stored token and user record.
///
/// Anything short of a complete, well-formed pair resets to anonymous and
/// leaves no credential keys behind. Never fails.
pub fn restore_session(storage: &dyn DurableStorage) -> Session {
    let token = storage.get(keys::TOKEN).filter(|t| !t.is_empty());
    let raw_user = storage.get(keys::USER).filter(|u| !u.is_empty());

    match (token, raw_user) {
        (Some(token), Some(raw_user)) => match parse_user(&raw_user) {
            Ok(user) => {
                tracing::info!(
                    user_id = %user.id,
                    role = %user.role,
                    "Session restored from storage"
                );
                Session::Authenticated(Credentials { user, token })
            }
            Err(e) => {
                tracing::warn!(error = %e, "Discarding stored session");
                clear_credentials(storage);
                Session::Anonymous
            }
        },
        (None, None) => {
            clear_credentials(storage);
            tracing::debug!("No stored session");
            Session::Anonymous
        }
        (token, _) => {
            tracing::warn!(
                has_token = token.is_some(),
                "Incomplete stored session, clearing"
            );
            clear_credentials(storage);
            Session::Anonymous
        }
    }
}

/// Remove both credential keys. Failures are logged, not returned.
pub(crate) fn clear_credentials(storage: &dyn DurableStorage) {
    for key in [keys::TOKEN, keys::USER] {
        if let Err(e) = storage.remove(key) {
            tracing::warn!(key, error = %e, "Failed to remove stored credential");
        }
    }
}
