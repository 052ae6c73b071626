//! Persistent string-keyed storage backends.
//!
//! This module abstracts over the synchronous key-value storage the
//! adapter persists into: the browser's localStorage on wasm targets,
//! or an in-memory map everywhere else (and in tests).

mod backend;

#[cfg(target_arch = "wasm32")]
pub use backend::LocalStorage;
pub use backend::{MemoryStorage, StorageBackend, StorageError};
