// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Durable client-side key/value storage.
//!
//! All persistence of the session goes through [`DurableStorage`]; the
//! session store never touches files directly.

pub mod file;
pub mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::error::AppError;

/// Storage key names as constants.
pub mod keys {
    /// Raw session token
    pub const TOKEN: &str = "token";
    /// JSON-serialized user record
    pub const USER: &str = "user";
}

/// Persistent string key/value store that survives process restarts.
pub trait DurableStorage: Send + Sync {
    /// Read a key. Missing keys are `None`.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a key, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), AppError>;

    /// Remove a key. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), AppError>;
}
