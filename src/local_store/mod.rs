//! The LocalStore adapter.
//!
//! Bridges a named [`crate::store::ModuleState`] container to a
//! [`crate::storage::StorageBackend`]: load-with-merge at bootstrap,
//! synchronous persist on every edit, optional reversible transform,
//! whole-blob expiration.

mod local_store;

pub use local_store::{
    Binding, LocalStore, LocalStoreError, Options, DEFAULT_STATE_KEY, DEFAULT_STORAGE_KEY,
};
