//! Session-scoped key/value storage
//!
//! Values live only as long as the browser tab. On native targets, and when
//! the browser refuses storage access, an in-memory map stands in.

use std::collections::HashMap;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session storage unavailable")]
    Unavailable,
    #[error("session storage rejected write to `{0}`")]
    Rejected(String),
}

/// Integer record store scoped to the browsing session
pub trait SessionStore {
    fn get(&self, key: &str) -> Option<i64>;
    fn set(&mut self, key: &str, value: i64) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, i64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Option<i64> {
        self.values.get(key).copied()
    }

    fn set(&mut self, key: &str, value: i64) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// `window.sessionStorage`, falling back to memory when it is unavailable
#[cfg(target_arch = "wasm32")]
pub struct BrowserSessionStore {
    storage: Option<web_sys::Storage>,
    fallback: MemoryStore,
}

#[cfg(target_arch = "wasm32")]
impl BrowserSessionStore {
    pub fn new() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.session_storage().ok())
            .flatten();
        if storage.is_none() {
            log::warn!("{}; keeping records in memory", StoreError::Unavailable);
        }
        Self {
            storage,
            fallback: MemoryStore::new(),
        }
    }
}

#[cfg(target_arch = "wasm32")]
impl SessionStore for BrowserSessionStore {
    fn get(&self, key: &str) -> Option<i64> {
        match &self.storage {
            Some(storage) => storage
                .get_item(key)
                .ok()
                .flatten()
                .and_then(|raw| raw.parse().ok()),
            None => self.fallback.get(key),
        }
    }

    fn set(&mut self, key: &str, value: i64) -> Result<(), StoreError> {
        match &self.storage {
            Some(storage) => storage
                .set_item(key, &value.to_string())
                .map_err(|_| StoreError::Rejected(key.to_string())),
            None => self.fallback.set(key, value),
        }
    }
}
