// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session store: the single source of truth for who is signed in.
//!
//! Handles:
//! - One-time restore from durable storage
//! - Login, registration and Google sign-in
//! - Local-first logout with best-effort server invalidation
//! - Profile refresh and password reset requests
//!
//! Every mutating call takes a generation number when it starts. A server
//! response is applied only if no other mutating call started since, so a
//! login still in flight when the user logs out is dropped and its token
//! revoked on the server.

use super::bootstrap::{clear_credentials, restore_session};
use super::state::{Credentials, Session};
use crate::config::ConfigError;
use crate::error::{AppError, Result};
use crate::models::{AuthResponse, LoginRequest, RegisterRequest, RegistrationRole, User};
use crate::services::{AuthApi, GoogleIdentity};
use crate::storage::{keys, DurableStorage};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use validator::{Validate, ValidateEmail};

pub struct SessionStore {
    api: Arc<dyn AuthApi>,
    storage: Arc<dyn DurableStorage>,
    google: Option<GoogleIdentity>,
    state: watch::Sender<Session>,
    generation: AtomicU64,
    /// Serializes the check-persist-publish step of every transition.
    commit: Mutex<()>,
}

impl SessionStore {
    pub fn new(api: Arc<dyn AuthApi>, storage: Arc<dyn DurableStorage>) -> Self {
        let (state, _) = watch::channel(Session::Bootstrapping);
        Self {
            api,
            storage,
            google: None,
            state,
            generation: AtomicU64::new(0),
            commit: Mutex::new(()),
        }
    }

    /// Enable Google sign-in.
    pub fn with_google(mut self, identity: GoogleIdentity) -> Self {
        self.google = Some(identity);
        self
    }

    /// Current session.
    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Watch for session changes.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    /// Restore the session from durable storage.
    ///
    /// Only the first call reads storage; later calls return the current
    /// session unchanged.
    pub fn bootstrap(&self) -> Session {
        let _guard = self.lock_commit();
        let storage = self.storage.as_ref();
        let restored = self.state.send_if_modified(|session| {
            if !session.is_loading() {
                return false;
            }
            *session = restore_session(storage);
            true
        });
        if !restored {
            tracing::debug!("Session already bootstrapped");
        }
        self.snapshot()
    }

    /// Sign in with email and password.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let request = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        request.validate()?;

        let generation = self.begin();
        let response = self.api.login(&request).await.inspect_err(|e| {
            tracing::info!(error = %e, "Login rejected");
        })?;
        self.settle(generation, response).await
    }

    /// Create an account and sign in. `role` defaults to student.
    pub async fn register(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        password: &str,
        role: Option<RegistrationRole>,
    ) -> Result<Session> {
        let request = RegisterRequest {
            first_name: first_name.trim().to_string(),
            last_name: last_name.trim().to_string(),
            email: email.trim().to_string(),
            password: password.to_string(),
            role: role.unwrap_or_default(),
        };
        request.validate()?;

        let generation = self.begin();
        let response = self.api.register(&request).await.inspect_err(|e| {
            tracing::info!(error = %e, "Registration rejected");
        })?;
        self.settle(generation, response).await
    }

    /// Sign in with a Google ID token. `role` applies to newly created accounts.
    pub async fn login_with_google(
        &self,
        id_token: &str,
        role: Option<RegistrationRole>,
    ) -> Result<Session> {
        let google = self
            .google
            .as_ref()
            .ok_or(AppError::Config(ConfigError::GoogleDisabled))?;
        let request = google.login_request(id_token, role.unwrap_or_default())?;
        request.validate()?;

        let generation = self.begin();
        let response = self.api.google_login(&request).await.inspect_err(|e| {
            tracing::info!(error = %e, "Google login rejected");
        })?;
        self.settle(generation, response).await
    }

    /// Sign out. Local state is cleared before the server is told; the
    /// server call may fail without consequence.
    pub async fn logout(&self) {
        let token = {
            let _guard = self.lock_commit();
            self.begin();
            let token = self.snapshot().token().map(str::to_string);
            self.clear_local();
            token
        };
        tracing::info!("Signed out");

        if let Some(token) = token {
            if let Err(e) = self.api.logout(&token).await {
                tracing::debug!(error = %e, "Server-side logout failed, ignoring");
            }
        }
    }

    /// Re-fetch the signed-in user's profile and store it.
    ///
    /// An expired token signs the user out locally.
    pub async fn refresh_profile(&self) -> Result<User> {
        let token = self
            .snapshot()
            .token()
            .map(str::to_string)
            .ok_or(AppError::NotAuthenticated)?;
        let generation = self.generation.load(Ordering::SeqCst);

        let user = match self.api.current_user(&token).await {
            Ok(user) => user,
            Err(AppError::SessionExpired) => {
                let _guard = self.lock_commit();
                if self.is_current(generation) {
                    tracing::info!("Session expired, signing out");
                    self.begin();
                    self.clear_local();
                }
                return Err(AppError::SessionExpired);
            }
            Err(e) => return Err(e),
        };

        let _guard = self.lock_commit();
        if !self.is_current(generation) {
            return Err(AppError::Superseded);
        }
        let user_json = serde_json::to_string(&user)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("serialize user: {}", e)))?;
        self.storage.set(keys::USER, &user_json)?;
        self.state.send_replace(Session::Authenticated(Credentials {
            user: user.clone(),
            token,
        }));
        tracing::debug!(user_id = %user.id, "Profile refreshed");
        Ok(user)
    }

    /// Ask the server to send a password reset email.
    pub async fn forgot_password(&self, email: &str) -> Result<()> {
        let email = email.trim();
        if !email.validate_email() {
            return Err(AppError::Validation("Invalid email format".to_string()));
        }
        self.api.forgot_password(email).await
    }

    /// Complete a password reset with the token from the reset email.
    pub async fn reset_password(&self, reset_token: &str, password: &str) -> Result<()> {
        if password.trim().is_empty() {
            return Err(AppError::Validation("Password is required".to_string()));
        }
        self.api.reset_password(reset_token, password).await
    }

    fn begin(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    fn lock_commit(&self) -> MutexGuard<'_, ()> {
        // The guarded data is `()`, so a poisoned lock carries no broken state.
        self.commit.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Apply a server response, revoking its token if it arrived too late.
    async fn settle(&self, generation: u64, response: AuthResponse) -> Result<Session> {
        let token = response.token.clone();
        let result = self.accept(generation, response);
        if matches!(result, Err(AppError::Superseded)) && !token.is_empty() {
            if let Err(e) = self.api.logout(&token).await {
                tracing::debug!(error = %e, "Failed to revoke discarded token");
            }
        }
        result
    }

    /// Persist a successful authentication and publish it.
    fn accept(&self, generation: u64, response: AuthResponse) -> Result<Session> {
        let _guard = self.lock_commit();
        if !self.is_current(generation) {
            tracing::info!("Discarding stale authentication response");
            return Err(AppError::Superseded);
        }

        let AuthResponse { user, token } = response;
        if token.trim().is_empty() {
            return Err(AppError::Internal(anyhow::anyhow!(
                "server returned an empty session token"
            )));
        }
        self.persist(&token, &user)?;

        let session = Session::Authenticated(Credentials { user, token });
        if let Some(user) = session.user() {
            tracing::info!(user_id = %user.id, role = %user.role, "Signed in");
        }
        self.state.send_replace(session.clone());
        Ok(session)
    }

    /// Write both credential keys, restoring the previous values if either
    /// write fails.
    fn persist(&self, token: &str, user: &User) -> Result<()> {
        let user_json = serde_json::to_string(user)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("serialize user: {}", e)))?;

        let previous_token = self.storage.get(keys::TOKEN);
        let previous_user = self.storage.get(keys::USER);

        let written = self
            .storage
            .set(keys::TOKEN, token)
            .and_then(|()| self.storage.set(keys::USER, &user_json));

        if let Err(e) = written {
            tracing::warn!(error = %e, "Failed to persist session, rolling back");
            self.restore_key(keys::TOKEN, previous_token);
            self.restore_key(keys::USER, previous_user);
            return Err(e);
        }
        Ok(())
    }

    fn restore_key(&self, key: &str, value: Option<String>) {
        let result = match value {
            Some(v) => self.storage.set(key, &v),
            None => self.storage.remove(key),
        };
        if let Err(e) = result {
            tracing::warn!(key, error = %e, "Rollback of stored credential failed");
        }
    }

    fn clear_local(&self) {
        clear_credentials(self.storage.as_ref());
        self.state.send_replace(Session::Anonymous);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use async_trait::async_trait;

    /// API that must never be reached.
    struct OfflineApi;

    #[async_trait]
    impl AuthApi for OfflineApi {
        async fn login(&self, _: &LoginRequest) -> Result<AuthResponse> {
            panic!("login should not be called")
        }
        async fn register(&self, _: &RegisterRequest) -> Result<AuthResponse> {
            panic!("register should not be called")
        }
        async fn google_login(
            &self,
            _: &crate::models::GoogleLoginRequest,
        ) -> Result<AuthResponse> {
            panic!("google_login should not be called")
        }
        async fn logout(&self, _: &str) -> Result<()> {
            Err(AppError::Unreachable("offline".to_string()))
        }
        async fn current_user(&self, _: &str) -> Result<User> {
            panic!("current_user should not be called")
        }
        async fn forgot_password(&self, _: &str) -> Result<()> {
            panic!("forgot_password should not be called")
        }
        async fn reset_password(&self, _: &str, _: &str) -> Result<()> {
            panic!("reset_password should not be called")
        }
    }

    fn store() -> SessionStore {
        SessionStore::new(Arc::new(OfflineApi), Arc::new(MemoryStorage::new()))
    }

    #[tokio::test]
    async fn test_invalid_email_is_rejected_locally() {
        let store = store();
        store.bootstrap();

        let err = store.login("not-an-email", "pw").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(store.snapshot(), Session::Anonymous);
    }

    #[tokio::test]
    async fn test_google_login_requires_configuration() {
        let store = store();
        let err = store.login_with_google("x.y.z", None).await.unwrap_err();
        assert!(matches!(err, AppError::Config(ConfigError::GoogleDisabled)));
    }

    #[tokio::test]
    async fn test_refresh_profile_requires_session() {
        let store = store();
        store.bootstrap();
        assert!(matches!(
            store.refresh_profile().await,
            Err(AppError::NotAuthenticated)
        ));
    }

    #[tokio::test]
    async fn test_subscribers_see_transitions() {
        let store = store();
        let mut rx = store.subscribe();
        assert!(rx.borrow().is_loading());

        store.bootstrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), Session::Anonymous);

        store.logout().await;
        assert_eq!(*rx.borrow_and_update(), Session::Anonymous);
    }
}
