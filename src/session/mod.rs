// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client-side authentication session.

pub mod bootstrap;
pub mod state;
pub mod store;

pub use bootstrap::restore_session;
pub use state::{Credentials, Session, SessionPhase};
pub use store::SessionStore;
