// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use coursehub_client::config::Config;
use coursehub_client::error::AppError;
use coursehub_client::models::{
    AuthResponse, GoogleLoginRequest, LoginRequest, RegisterRequest, Role, User,
};
use coursehub_client::services::AuthApi;
use coursehub_client::session::SessionStore;
use coursehub_client::storage::{DurableStorage, MemoryStorage};
use coursehub_client::AppContext;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Build a user fixture.
#[allow(dead_code)]
pub fn user(id: &str, email: &str, role: Role) -> User {
    User {
        id: id.to_string(),
        email: email.to_string(),
        first_name: "Test".to_string(),
        last_name: format!("{:?}", role),
        role,
        avatar: None,
        bio: None,
        created_at: "2025-01-01T09:00:00".to_string(),
        updated_at: "2025-01-01T09:00:00".to_string(),
    }
}

/// In-process stand-in for the auth API.
#[derive(Default)]
pub struct FakeAuthApi {
    accounts: Mutex<HashMap<String, (String, User)>>,
    next_id: AtomicUsize,
    /// Server-side logout fails when set.
    pub fail_logout: AtomicBool,
    pub logout_calls: AtomicUsize,
    /// Tokens passed to server-side logout, in call order.
    pub revoked: Mutex<Vec<String>>,
    /// Issue empty session tokens when set.
    pub blank_tokens: AtomicBool,
    /// `/auth/me` reports an expired token when set.
    pub token_expired: AtomicBool,
    /// Login waits on this before answering, when present.
    pub gate: Option<Arc<Notify>>,
}

#[allow(dead_code)]
impl FakeAuthApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gated(gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    /// Add an account and return the user record the server will report.
    pub fn with_account(self, email: &str, password: &str, role: Role) -> Self {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let user = user(&format!("u{}", id), email, role);
        self.accounts
            .lock()
            .unwrap()
            .insert(email.to_string(), (password.to_string(), user));
        self
    }

    pub fn account(&self, email: &str) -> Option<User> {
        self.accounts
            .lock()
            .unwrap()
            .get(email)
            .map(|(_, u)| u.clone())
    }

    pub fn set_bio(&self, email: &str, bio: &str) {
        if let Some((_, user)) = self.accounts.lock().unwrap().get_mut(email) {
            user.bio = Some(bio.to_string());
        }
    }

    fn issue(&self, user: &User) -> AuthResponse {
        let token = if self.blank_tokens.load(Ordering::SeqCst) {
            String::new()
        } else {
            format!("token-{}", user.id)
        };
        AuthResponse {
            user: user.clone(),
            token,
        }
    }

    fn find_by_token(&self, token: &str) -> Option<User> {
        self.accounts
            .lock()
            .unwrap()
            .values()
            .find(|(_, u)| format!("token-{}", u.id) == token)
            .map(|(_, u)| u.clone())
    }
}

#[async_trait]
impl AuthApi for FakeAuthApi {
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, AppError> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        match self.accounts.lock().unwrap().get(&request.email) {
            Some((password, user)) if *password == request.password => Ok(self.issue(user)),
            _ => Err(AppError::InvalidCredentials("Invalid credentials".to_string())),
        }
    }

    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, AppError> {
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.contains_key(&request.email) {
            return Err(AppError::DuplicateEmail("Email already in use".to_string()));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let mut new_user = user(&format!("u{}", id), &request.email, request.role.into());
        new_user.first_name = request.first_name.clone();
        new_user.last_name = request.last_name.clone();
        accounts.insert(
            request.email.clone(),
            (request.password.clone(), new_user.clone()),
        );
        Ok(self.issue(&new_user))
    }

    async fn google_login(&self, request: &GoogleLoginRequest) -> Result<AuthResponse, AppError> {
        let mut accounts = self.accounts.lock().unwrap();
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let (_, user) = accounts.entry(request.email.clone()).or_insert_with(|| {
            let mut u = user(&format!("u{}", id), &request.email, request.role.into());
            u.first_name = request.first_name.clone();
            u.last_name = request.last_name.clone();
            u.avatar = request.profile_image.clone();
            (String::new(), u)
        });
        Ok(self.issue(user))
    }

    async fn logout(&self, token: &str) -> Result<(), AppError> {
        self.logout_calls.fetch_add(1, Ordering::SeqCst);
        self.revoked.lock().unwrap().push(token.to_string());
        if self.fail_logout.load(Ordering::SeqCst) {
            return Err(AppError::Unreachable("connection refused".to_string()));
        }
        Ok(())
    }

    async fn current_user(&self, token: &str) -> Result<User, AppError> {
        if self.token_expired.load(Ordering::SeqCst) {
            return Err(AppError::SessionExpired);
        }
        self.find_by_token(token).ok_or(AppError::SessionExpired)
    }

    async fn forgot_password(&self, _email: &str) -> Result<(), AppError> {
        Ok(())
    }

    async fn reset_password(&self, _reset_token: &str, _password: &str) -> Result<(), AppError> {
        Ok(())
    }
}

/// Memory storage whose writes to one key can be made to fail.
#[allow(dead_code)]
#[derive(Default)]
pub struct FlakyStorage {
    inner: MemoryStorage,
    fail_key: Mutex<Option<String>>,
}

#[allow(dead_code)]
impl FlakyStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes_to(&self, key: Option<&str>) {
        *self.fail_key.lock().unwrap() = key.map(str::to_string);
    }
}

impl DurableStorage for FlakyStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        if self.fail_key.lock().unwrap().as_deref() == Some(key) {
            return Err(AppError::Storage(format!("quota exceeded writing {}", key)));
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), AppError> {
        self.inner.remove(key)
    }
}

/// A bootstrapped store over the given collaborators.
#[allow(dead_code)]
pub fn bootstrapped_store(
    api: Arc<FakeAuthApi>,
    storage: Arc<dyn DurableStorage>,
) -> Arc<SessionStore> {
    let store = Arc::new(SessionStore::new(api, storage));
    store.bootstrap();
    store
}

/// Create a test app context with offline collaborators.
#[allow(dead_code)]
pub fn create_test_context(api: Arc<FakeAuthApi>) -> (AppContext, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::new());
    let ctx = AppContext::from_parts(Config::test_default(), api, storage.clone());
    (ctx, storage)
}
