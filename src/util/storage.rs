//! Durable key-value storage and the credential store built on it.
//!
//! SYSTEM CONTEXT
//! ==============
//! In the browser this is `localStorage` (per-origin, survives reloads).
//! Natively it is a small JSON file so the CLI keeps its session between runs.
//! `MemoryStore` backs tests and throwaway sessions.
//!
//! TRADE-OFFS
//! ==========
//! Reads never fail: an unreadable store looks like an empty one, so a broken
//! storage backend degrades to "signed out" instead of an error page.

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("storage error: {0}")]
pub struct StorageError(pub String);

/// Opaque string key-value store.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;

    /// # Errors
    ///
    /// Returns an error if the backend rejects the write (quota, I/O).
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns an error if the backend rejects the write (quota, I/O).
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

// =============================================================================
// MEMORY
// =============================================================================

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

// =============================================================================
// FILE (native)
// =============================================================================

/// JSON object on disk, rewritten on every mutation.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug)]
pub struct FileStore {
    path: std::path::PathBuf,
    entries: RefCell<BTreeMap<String, String>>,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileStore {
    /// Open the store at `path`. A missing file is an empty store.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<std::path::PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw)
                .map_err(|e| StorageError(format!("{}: {e}", path.display())))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(StorageError(format!("{}: {e}", path.display()))),
        };
        Ok(Self { path, entries: RefCell::new(entries) })
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let raw = serde_json::to_string_pretty(entries).map_err(|e| StorageError(e.to_string()))?;
        std::fs::write(&self.path, raw).map_err(|e| StorageError(format!("{}: {e}", self.path.display())))
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.borrow_mut();
        entries.insert(key.to_owned(), value.to_owned());
        self.flush(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.borrow_mut();
        if entries.remove(key).is_none() {
            return Ok(());
        }
        self.flush(&entries)
    }
}

// =============================================================================
// LOCAL STORAGE (browser)
// =============================================================================

#[cfg(feature = "hydrate")]
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorage;

#[cfg(feature = "hydrate")]
impl LocalStorage {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window().and_then(|w| w.local_storage().ok().flatten())
    }
}

#[cfg(feature = "hydrate")]
impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let storage = Self::storage().ok_or_else(|| StorageError("localStorage unavailable".to_owned()))?;
        storage
            .set_item(key, value)
            .map_err(|e| StorageError(format!("{e:?}")))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let Some(storage) = Self::storage() else {
            return Ok(());
        };
        storage
            .remove_item(key)
            .map_err(|e| StorageError(format!("{e:?}")))
    }
}

// =============================================================================
// TOKEN STORE
// =============================================================================

/// The single durable credential slot.
///
/// Callers read the token per operation and never cache it.
#[derive(Clone)]
pub struct TokenStore {
    store: Rc<dyn KeyValueStore>,
    key: String,
}

impl TokenStore {
    pub fn new(store: Rc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self { store, key: key.into() }
    }

    /// Current credential. An empty stored value counts as absent.
    #[must_use]
    pub fn get(&self) -> Option<String> {
        self.store.get(&self.key).filter(|token| !token.is_empty())
    }

    /// # Errors
    ///
    /// Returns an error if the backing store rejects the write.
    pub fn set(&self, token: &str) -> Result<(), StorageError> {
        self.store.set(&self.key, token)
    }

    /// # Errors
    ///
    /// Returns an error if the backing store rejects the write.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(&self.key)
    }
}
