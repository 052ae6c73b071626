use std::collections::HashMap;
use std::sync::RwLock;

/// Error from a storage backend operation.
///
/// `MemoryStorage` never produces one; the wasm `LocalStorage` backend
/// surfaces the underlying JS error as a string.
#[derive(Debug, thiserror::Error)]
#[error("storage backend error: {0}")]
pub struct StorageError(pub String);

/// A synchronous string-keyed key-value storage.
///
/// Method names follow the web Storage API (`getItem`/`setItem`) so the
/// wasm backend is a direct passthrough. Deliberately not `Send + Sync`:
/// the adapter runs on the UI thread, and the browser backend wraps a
/// thread-bound JS handle.
pub trait StorageBackend {
    /// Read the value stored under `key`, if any.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, overwriting any previous value.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory storage backend.
///
/// The default on non-wasm targets and the backend of choice in tests.
/// Contents live for the lifetime of the process.
#[derive(Default)]
pub struct MemoryStorage {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create an empty in-memory storage.
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.read().unwrap().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items
            .write()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Browser localStorage backend (wasm32 only).
#[cfg(target_arch = "wasm32")]
pub struct LocalStorage {
    storage: web_sys::Storage,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    /// Grab the window's localStorage.
    ///
    /// Returns an error when no window exists or storage access is
    /// denied (e.g. sandboxed iframes).
    pub fn window() -> Result<Self, StorageError> {
        let storage = web_sys::window()
            .ok_or_else(|| StorageError("no window".to_string()))?
            .local_storage()
            .map_err(|e| StorageError(format!("{e:?}")))?
            .ok_or_else(|| StorageError("localStorage unavailable".to_string()))?;
        Ok(Self { storage })
    }
}

#[cfg(target_arch = "wasm32")]
impl StorageBackend for LocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage
            .get_item(key)
            .map_err(|e| StorageError(format!("{e:?}")))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| StorageError(format!("{e:?}")))
    }
}
