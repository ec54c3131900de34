// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! CourseHub client: session and role-gated navigation for the course
//! marketplace.
//!
//! This crate keeps track of who is signed in, persists that across
//! restarts, and decides which views a user may open. Everything else is
//! delegated to the CourseHub REST API.

pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod session;
pub mod storage;

use config::Config;
use routes::Router;
use services::{AuthApi, GoogleIdentity, HttpAuthApi};
use session::SessionStore;
use std::sync::Arc;
use storage::{DurableStorage, FileStorage};

/// Shared application context, created once at startup and handed to views.
pub struct AppContext {
    pub config: Config,
    pub session: Arc<SessionStore>,
    pub router: Router,
}

impl AppContext {
    /// Wire the HTTP API and file storage from config, then restore the session.
    pub fn from_config(config: Config) -> error::Result<Self> {
        let api = Arc::new(HttpAuthApi::new(&config)?);
        let storage = Arc::new(FileStorage::open(&config.storage_path));
        tracing::debug!(path = %storage.path().display(), "Using file storage");
        Ok(Self::from_parts(config, api, storage))
    }

    /// Build from explicit collaborators, then restore the session.
    pub fn from_parts(
        config: Config,
        api: Arc<dyn AuthApi>,
        storage: Arc<dyn DurableStorage>,
    ) -> Self {
        let mut store = SessionStore::new(api, storage);
        match GoogleIdentity::from_config(&config) {
            Ok(identity) => store = store.with_google(identity),
            Err(e) => tracing::debug!(reason = %e, "Google sign-in disabled"),
        }
        let session = Arc::new(store);
        session.bootstrap();

        Self {
            config,
            router: Router::new(session.clone()),
            session,
        }
    }
}
