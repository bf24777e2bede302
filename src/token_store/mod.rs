//! Bearer credentials and the small session profile written at login.
//!
//! Values live in a [`KeyValueStorage`]; when storage has nothing (or is
//! unavailable) lookups fall back to same-named cookies. Reads never fail and
//! writes never fail: storage errors are logged and treated as "not found".

pub mod cookies;
pub mod storage;


use std::sync::Arc;

use tracing::{debug, warn};

pub use cookies::{CookieSource, SessionCookies};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, StorageError, UnavailableStorage};

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub const USER_ID_KEY: &str = "userId";
pub const USERNAME_KEY: &str = "username";
pub const ROLE_NAME_KEY: &str = "roleName";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tokens {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl Tokens {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
            refresh_token: Some(refresh_token.into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionProfile {
    pub user_id: Option<String>,
    pub username: Option<String>,
    pub role_name: Option<String>,
}

#[derive(Clone)]
pub struct TokenStore {
    storage: Arc<dyn KeyValueStorage>,
    cookies: Option<Arc<dyn CookieSource>>,
}

impl TokenStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            storage,
            cookies: None,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    pub fn with_cookies(mut self, cookies: Arc<dyn CookieSource>) -> Self {
        self.cookies = Some(cookies);
        self
    }

    pub fn cookies(&self) -> Option<&Arc<dyn CookieSource>> {
        self.cookies.as_ref()
    }

    /// Access token from storage, then from the `access_token` cookie, else `""`.
    pub fn access_token(&self) -> String {
        self.lookup(ACCESS_TOKEN_KEY).unwrap_or_default()
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read_storage(REFRESH_TOKEN_KEY)
    }

    pub fn set_tokens(&self, tokens: &Tokens) {
        self.write(ACCESS_TOKEN_KEY, tokens.access_token.as_deref());
        self.write(REFRESH_TOKEN_KEY, tokens.refresh_token.as_deref());
    }

    pub fn clear_tokens(&self) {
        self.remove(ACCESS_TOKEN_KEY);
        self.remove(REFRESH_TOKEN_KEY);
    }

    pub fn user_id(&self) -> Option<String> {
        self.lookup(USER_ID_KEY)
    }

    pub fn profile(&self) -> SessionProfile {
        SessionProfile {
            user_id: self.lookup(USER_ID_KEY),
            username: self.lookup(USERNAME_KEY),
            role_name: self.lookup(ROLE_NAME_KEY),
        }
    }

    pub fn set_profile(&self, profile: &SessionProfile) {
        self.write(USER_ID_KEY, profile.user_id.as_deref());
        self.write(USERNAME_KEY, profile.username.as_deref());
        self.write(ROLE_NAME_KEY, profile.role_name.as_deref());
    }

    pub fn clear_profile(&self) {
        self.remove(USER_ID_KEY);
        self.remove(USERNAME_KEY);
        self.remove(ROLE_NAME_KEY);
    }

    fn lookup(&self, key: &str) -> Option<String> {
        self.read_storage(key).or_else(|| {
            self.cookies
                .as_ref()
                .and_then(|cookies| cookies.get(key))
        })
    }

    fn read_storage(&self, key: &str) -> Option<String> {
        match self.storage.get_item(key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                debug!(key, error = %e, "Token storage read failed");
                None
            }
        }
    }

    fn write(&self, key: &str, value: Option<&str>) {
        let Some(value) = value.filter(|v| !v.is_empty()) else {
            return;
        };
        if let Err(e) = self.storage.set_item(key, value) {
            warn!(key, error = %e, "Token storage write failed");
        }
    }

    fn remove(&self, key: &str) {
        if let Err(e) = self.storage.remove_item(key) {
            warn!(key, error = %e, "Token storage remove failed");
        }
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore")
            .field("has_cookies", &self.cookies.is_some())
            .finish_non_exhaustive()
    }
}
