// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - remote collaborators.

pub mod auth_api;
pub mod google_identity;

pub use auth_api::{AuthApi, HttpAuthApi};
pub use google_identity::{GoogleClaims, GoogleIdentity};
