//! # Localstore
//!
//! A persistence adapter for reactive state containers.
//!
//! Localstore keeps a named in-memory state container and a persistent
//! string-keyed storage (the browser's localStorage on wasm) eventually
//! consistent: the blob is loaded and merged under the defaults once at
//! bootstrap, and every edit re-serializes the whole container back to
//! storage synchronously.
//!
//! ## Store (host side)
//!
//! - `StateStore` - The application's central state tree, a registry of
//!   named modules
//! - `ModuleState` - One named container with getters and change
//!   subscriptions
//!
//! ## Adapter
//!
//! - `LocalStore` - Registration, load-with-merge, persist-on-edit
//! - `Binding` - Explicit two-way binding to one container key
//! - Optional reversible base64 transform of the stored blob
//! - Whole-blob expiration via the reserved `expire` field
//!
//! ```
//! use localstore::{LocalStore, MemoryStorage, Options, StateStore};
//! use std::sync::Arc;
//!
//! let store = StateStore::new();
//! let storage = Arc::new(MemoryStorage::new());
//!
//! let ls = LocalStore::register(&store, storage, Options::default()).unwrap();
//! ls.init().unwrap();
//!
//! ls.edit("theme", serde_json::json!("dark")).unwrap();
//! assert_eq!(ls.module().get("theme"), Some(serde_json::json!("dark")));
//! ```

pub mod blob;
pub mod local_store;
pub mod storage;
pub mod store;

// Re-export main types for convenience
pub use blob::{Blob, BlobError, StoredText};
pub use local_store::{Binding, LocalStore, LocalStoreError, Options};
#[cfg(target_arch = "wasm32")]
pub use storage::LocalStorage;
pub use storage::{MemoryStorage, StorageBackend, StorageError};
pub use store::{Container, Getter, ModuleState, StateStore};
