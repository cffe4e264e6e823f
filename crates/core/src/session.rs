//! Session-credential storage.
//!
//! The marketplace backend issues a JWT pair at login, along with the user's
//! role and username. The browser front-ends keep those in four independent
//! per-tab storage slots; here the same slots live behind the [`SessionStore`]
//! trait so the client can be wired to a keyring, a file, or an in-memory map
//! in tests.
//!
//! Stores are infallible, like browser session storage. The only writers are
//! login, logout and token refresh; concurrent writers are last-one-wins.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

/// Storage key for the bearer access token.
pub const ACCESS_TOKEN_KEY: &str = "access_token";
/// Storage key for the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
/// Storage key for the role issued at login.
pub const ROLE_KEY: &str = "role";
/// Storage key for the username issued at login.
pub const USERNAME_KEY: &str = "username";

/// Credential set returned by the token endpoint.
///
/// `role` and `username` are extra claims the backend adds to the standard
/// token pair; older deployments omit them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCredentials {
    pub access: String,
    pub refresh: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// Key-value store for session credentials.
pub trait SessionStore: Debug + Send + Sync {
    /// Value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str);

    /// Remove the slot for `key`.
    fn remove(&self, key: &str);

    /// Remove every stored slot, known keys or not.
    fn clear(&self);
}

/// In-memory [`SessionStore`] for native embedding and tests.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    slots: RwLock<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.slots
            .read()
            .expect("session store lock poisoned")
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.slots
            .write()
            .expect("session store lock poisoned")
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.slots
            .write()
            .expect("session store lock poisoned")
            .remove(key);
    }

    fn clear(&self) {
        self.slots
            .write()
            .expect("session store lock poisoned")
            .clear();
    }
}
