use std::collections::HashMap;

pub const AUTH_KEY: &str = "admin_authenticated";
pub const ADMIN_ID_KEY: &str = "admin_id";

/// String key/value persistence standing in for browser session storage.
/// Values live for the lifetime of the store; there is no expiry in this
/// layer — the server rejects stale sessions on its own.
pub trait SessionStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Route {
    Dashboard,
    Login,
}

/// View-entry gate: the persisted flag is trusted as-is, with no server
/// round-trip. An absent or false flag denies access and routes to login.
pub fn guard<S: SessionStore>(store: &S) -> Route {
    if is_authenticated(store) {
        Route::Dashboard
    } else {
        Route::Login
    }
}

pub fn is_authenticated<S: SessionStore>(store: &S) -> bool {
    store.get(AUTH_KEY).as_deref() == Some("true")
}

pub fn admin_id<S: SessionStore>(store: &S) -> Option<i64> {
    store.get(ADMIN_ID_KEY).and_then(|id| id.parse().ok())
}

pub fn persist_session<S: SessionStore>(store: &mut S, admin_id: i64) {
    store.set(AUTH_KEY, "true");
    store.set(ADMIN_ID_KEY, &admin_id.to_string());
}

pub fn clear_session<S: SessionStore>(store: &mut S) {
    store.remove(AUTH_KEY);
    store.remove(ADMIN_ID_KEY);
}
