use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::blob::{self, BlobError};
use crate::storage::{StorageBackend, StorageError};
use crate::store::{AlreadyRegistered, Container, Getter, ModuleState, StateStore};

/// Default container/module name.
pub const DEFAULT_STATE_KEY: &str = "$ls";

/// Default storage key.
pub const DEFAULT_STORAGE_KEY: &str = "store";

/// Registration-time options.
///
/// Everything is resolved once in [`LocalStore::register`]; there is no
/// process-wide mutable configuration afterwards.
#[derive(Default)]
pub struct Options {
    /// Container name inside the state store. Defaults to
    /// [`DEFAULT_STATE_KEY`].
    pub state_key: Option<String>,
    /// Key the blob is stored under. Defaults to
    /// [`DEFAULT_STORAGE_KEY`].
    pub storage_key: Option<String>,
    /// Apply the reversible transform to the stored blob.
    pub encode: bool,
    /// Initial container contents. Defaults to an empty container.
    pub state: Option<Container>,
    /// Derived read-only projections, passed through to the module
    /// verbatim.
    pub getters: HashMap<String, Getter>,
}

/// Resolved configuration, immutable after registration.
#[derive(Clone)]
struct Config {
    state_key: String,
    storage_key: String,
    encode: bool,
}

/// Errors from adapter operations.
#[derive(Debug, thiserror::Error)]
pub enum LocalStoreError {
    #[error(transparent)]
    AlreadyRegistered(#[from] AlreadyRegistered),
    #[error(transparent)]
    Blob(#[from] BlobError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Handle to a registered, persisted state container.
///
/// Cloning is cheap and every clone addresses the same container and
/// storage key. Components compose with it explicitly, either through
/// the named operations or through [`LocalStore::bind`].
#[derive(Clone)]
pub struct LocalStore {
    config: Config,
    module: Arc<ModuleState>,
    storage: Arc<dyn StorageBackend>,
}

impl LocalStore {
    /// Install the container module into `store` and return the
    /// adapter handle.
    ///
    /// Call once at bootstrap, before [`LocalStore::init`]; registering
    /// the same container name twice is an error.
    pub fn register(
        store: &StateStore,
        storage: Arc<dyn StorageBackend>,
        options: Options,
    ) -> Result<Self, LocalStoreError> {
        let Options {
            state_key,
            storage_key,
            encode,
            state,
            getters,
        } = options;
        let config = Config {
            state_key: state_key.unwrap_or_else(|| DEFAULT_STATE_KEY.to_string()),
            storage_key: storage_key.unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_string()),
            encode,
        };
        let module = store.register_module(
            &config.state_key,
            ModuleState::new(state.unwrap_or_default(), getters),
        )?;
        Ok(Self {
            config,
            module,
            storage,
        })
    }

    /// Load the persisted blob and merge it over the current defaults.
    ///
    /// Absent blob: nothing to merge, current state is persisted as-is.
    /// Expired blob: discarded whole; the trailing persist overwrites
    /// it with the defaults. Corrupt blob: the error propagates and
    /// initialization fails; there is no silent fallback.
    ///
    /// Runs once per process lifetime, at bootstrap, after
    /// [`LocalStore::register`].
    pub fn init(&self) -> Result<(), LocalStoreError> {
        self.init_at(now_ms())
    }

    pub(crate) fn init_at(&self, now_ms: f64) -> Result<(), LocalStoreError> {
        if let Some(raw) = self.storage.get_item(&self.config.storage_key)? {
            let blob = blob::decode(&raw)?;
            if blob.is_live(now_ms) {
                let merged = blob.merge_over(&self.module.snapshot());
                self.module.replace(merged);
                log::info!(
                    "loaded container {:?} from storage key {:?}",
                    self.config.state_key,
                    self.config.storage_key
                );
            } else {
                log::info!(
                    "discarding expired blob under storage key {:?}",
                    self.config.storage_key
                );
            }
        }
        // Echo the (possibly unchanged) state back to storage.
        self.refresh()
    }

    /// Serialize the container and write it to storage, overwriting
    /// any prior blob.
    pub fn refresh(&self) -> Result<(), LocalStoreError> {
        let text = self
            .module
            .read(|state| blob::encode(state, self.config.encode))?;
        self.storage.set_item(&self.config.storage_key, &text)?;
        log::debug!(
            "persisted {} bytes under storage key {:?}",
            text.len(),
            self.config.storage_key
        );
        Ok(())
    }

    /// Set one container key and persist.
    ///
    /// Key and value are taken as-is; no validation. Subscribers run
    /// before the write to storage.
    pub fn edit(&self, key: impl Into<String>, value: Value) -> Result<(), LocalStoreError> {
        let key = key.into();
        self.module.update(|state| {
            state.insert(key, value);
        });
        self.refresh()
    }

    /// Two-way binding to one container key.
    pub fn bind(&self, key: impl Into<String>) -> Binding {
        Binding {
            adapter: self.clone(),
            key: key.into(),
        }
    }

    /// The underlying module, for reads and subscriptions.
    pub fn module(&self) -> &Arc<ModuleState> {
        &self.module
    }
}

/// Read/write accessor for a single container key.
///
/// Declared once by a component instead of wiring getter, setter and
/// action by hand: reads come straight from the container, writes go
/// through [`LocalStore::edit`] and therefore persist.
pub struct Binding {
    adapter: LocalStore,
    key: String,
}

impl Binding {
    /// Current value under the bound key, if any.
    pub fn get(&self) -> Option<Value> {
        self.adapter.module.get(&self.key)
    }

    /// Write a new value under the bound key and persist.
    pub fn set(&self, value: Value) -> Result<(), LocalStoreError> {
        self.adapter.edit(self.key.clone(), value)
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn now_ms() -> f64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as f64)
        .unwrap_or(0.0)
}

#[cfg(target_arch = "wasm32")]
fn now_ms() -> f64 {
    js_sys::Date::now()
}
