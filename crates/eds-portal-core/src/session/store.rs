use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::{debug, info, warn};

use super::storage::{MemoryStorage, Storage, TOKEN_KEY, USER_KEY};
use crate::models::UserProfile;

/// Which scope a new session is written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Persistence {
    /// Survives restarts ("remember me")
    Durable,
    /// Gone when the browsing context ends
    #[default]
    Ephemeral,
}

/// Owner of the session credential across the durable and ephemeral scopes.
///
/// The token lives in at most one scope at a time. `set` and `clear` are
/// the only mutators; reads never fail (storage errors are logged and read
/// as absence).
pub struct SessionStore {
    durable: Arc<dyn Storage>,
    ephemeral: Arc<dyn Storage>,
}

impl SessionStore {
    pub fn new(durable: Arc<dyn Storage>, ephemeral: Arc<dyn Storage>) -> Self {
        Self { durable, ephemeral }
    }

    /// Store with both scopes held in memory
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()), Arc::new(MemoryStorage::new()))
    }

    /// Bearer token, ephemeral scope first, then durable.
    pub fn token(&self) -> Option<String> {
        self.read(self.ephemeral.as_ref(), TOKEN_KEY)
            .or_else(|| self.read(self.durable.as_ref(), TOKEN_KEY))
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Start a session in the given scope, removing any token held by the other.
    pub fn set(&self, token: &str, persistence: Persistence) -> Result<()> {
        if token.is_empty() {
            bail!("Refusing to store an empty session token");
        }
        let (target, other) = self.scopes(persistence);
        target
            .set(TOKEN_KEY, token)
            .context("Failed to store session token")?;
        other
            .remove(TOKEN_KEY)
            .context("Failed to remove session token from previous scope")?;
        info!(?persistence, "Session started");
        Ok(())
    }

    /// Cache the signed-in user's profile next to the token.
    pub fn set_user(&self, user: &UserProfile, persistence: Persistence) -> Result<()> {
        let (target, other) = self.scopes(persistence);
        let json = serde_json::to_string(user).context("Failed to serialize user profile")?;
        target
            .set(USER_KEY, &json)
            .context("Failed to store user profile")?;
        other
            .remove(USER_KEY)
            .context("Failed to remove user profile from previous scope")?;
        Ok(())
    }

    pub fn user(&self) -> Option<UserProfile> {
        let raw = self
            .read(self.ephemeral.as_ref(), USER_KEY)
            .or_else(|| self.read(self.durable.as_ref(), USER_KEY))?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable cached user profile");
                None
            }
        }
    }

    /// Remove the token and cached profile from both scopes.
    /// Clearing an already-empty session is a no-op.
    pub fn clear(&self) {
        for scope in [self.ephemeral.as_ref(), self.durable.as_ref()] {
            for key in [TOKEN_KEY, USER_KEY] {
                if let Err(e) = scope.remove(key) {
                    warn!(key, error = %e, "Failed to clear session entry");
                }
            }
        }
        debug!("Session cleared");
    }

    fn scopes(&self, persistence: Persistence) -> (&dyn Storage, &dyn Storage) {
        match persistence {
            Persistence::Durable => (self.durable.as_ref(), self.ephemeral.as_ref()),
            Persistence::Ephemeral => (self.ephemeral.as_ref(), self.durable.as_ref()),
        }
    }

    fn read(&self, scope: &dyn Storage, key: &str) -> Option<String> {
        match scope.get(key) {
            Ok(Some(value)) if !value.is_empty() => Some(value),
            Ok(_) => None,
            Err(e) => {
                warn!(key, error = %e, "Failed to read session entry");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn store_with_scopes() -> (SessionStore, Arc<MemoryStorage>, Arc<MemoryStorage>) {
        let durable = Arc::new(MemoryStorage::new());
        let ephemeral = Arc::new(MemoryStorage::new());
        let store = SessionStore::new(durable.clone(), ephemeral.clone());
        (store, durable, ephemeral)
    }

    fn profile() -> UserProfile {
        UserProfile {
            username: "agent7".to_string(),
            is_staff: false,
            signed_in_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_store_is_unauthenticated() {
        let store = SessionStore::in_memory();
        assert_eq!(store.token(), None);
        assert!(!store.is_authenticated());
        assert_eq!(store.user(), None);
    }

    #[test]
    fn test_token_found_in_either_scope() {
        let (store, durable, ephemeral) = store_with_scopes();
        durable.set(TOKEN_KEY, "durable-token").unwrap();
        assert_eq!(store.token().as_deref(), Some("durable-token"));

        durable.remove(TOKEN_KEY).unwrap();
        ephemeral.set(TOKEN_KEY, "session-token").unwrap();
        assert_eq!(store.token().as_deref(), Some("session-token"));
    }

    #[test]
    fn test_ephemeral_scope_read_first() {
        let (store, durable, ephemeral) = store_with_scopes();
        durable.set(TOKEN_KEY, "durable-token").unwrap();
        ephemeral.set(TOKEN_KEY, "session-token").unwrap();
        assert_eq!(store.token().as_deref(), Some("session-token"));
    }

    #[test]
    fn test_empty_token_is_absent() {
        let (store, durable, _) = store_with_scopes();
        durable.set(TOKEN_KEY, "").unwrap();
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_set_keeps_token_in_one_scope() {
        let (store, durable, ephemeral) = store_with_scopes();
        store.set("first", Persistence::Durable).unwrap();
        assert_eq!(durable.get(TOKEN_KEY).unwrap().as_deref(), Some("first"));

        store.set("second", Persistence::Ephemeral).unwrap();
        assert_eq!(ephemeral.get(TOKEN_KEY).unwrap().as_deref(), Some("second"));
        assert_eq!(durable.get(TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn test_set_rejects_empty_token() {
        let store = SessionStore::in_memory();
        assert!(store.set("", Persistence::Durable).is_err());
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_clear_removes_everything() {
        let (store, durable, ephemeral) = store_with_scopes();
        store.set("abc", Persistence::Durable).unwrap();
        store.set_user(&profile(), Persistence::Durable).unwrap();
        ephemeral.set(TOKEN_KEY, "stray").unwrap();

        store.clear();

        for scope in [&durable, &ephemeral] {
            assert_eq!(scope.get(TOKEN_KEY).unwrap(), None);
            assert_eq!(scope.get(USER_KEY).unwrap(), None);
        }
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let store = SessionStore::in_memory();
        store.clear();
        store.clear();
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_user_round_trip_and_bad_json() {
        let (store, _, ephemeral) = store_with_scopes();
        let user = profile();
        store.set_user(&user, Persistence::Ephemeral).unwrap();
        assert_eq!(store.user(), Some(user));

        ephemeral.set(USER_KEY, "not json").unwrap();
        assert_eq!(store.user(), None);
    }
}
