//! Session credential management.
//!
//! This module provides:
//! - `Storage`: a key/value scope (`MemoryStorage` for the ephemeral scope,
//!   `KeyringStorage` for the durable scope backed by the OS keychain)
//! - `SessionStore`: the single owner of the bearer token and the cached
//!   user profile across both scopes
//!
//! A session is authenticated exactly when a non-empty token exists in
//! either scope. There is no expiry metadata; a rejected call is the only
//! signal that a token went stale.

pub mod storage;
pub mod store;

pub use storage::{KeyringStorage, MemoryStorage, Storage, TOKEN_KEY, USER_KEY};
pub use store::{Persistence, SessionStore};
