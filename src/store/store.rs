use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde_json::Value;

/// The persisted portion of the application state: a mapping from
/// string keys to arbitrary JSON values.
pub type Container = serde_json::Map<String, Value>;

/// A derived read-only projection of a container.
pub type Getter = Arc<dyn Fn(&Container) -> Value + Send + Sync>;

type Subscriber = Box<dyn Fn(&Container) + Send + Sync>;

/// Error from registering a module under a name already in use.
#[derive(Debug, thiserror::Error)]
#[error("module {0:?} is already registered")]
pub struct AlreadyRegistered(pub String);

/// The application's central state tree.
///
/// A registry of named [`ModuleState`]s. Registration happens once per
/// module at bootstrap; lookups hand out shared handles.
#[derive(Default)]
pub struct StateStore {
    modules: RwLock<HashMap<String, Arc<ModuleState>>>,
}

impl StateStore {
    /// Create an empty state store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a module under `name`.
    ///
    /// Fails when the name is taken; a module is registered exactly
    /// once per process lifetime.
    pub fn register_module(
        &self,
        name: &str,
        module: ModuleState,
    ) -> Result<Arc<ModuleState>, AlreadyRegistered> {
        let mut modules = self.modules.write().unwrap();
        if modules.contains_key(name) {
            return Err(AlreadyRegistered(name.to_string()));
        }
        let module = Arc::new(module);
        modules.insert(name.to_string(), Arc::clone(&module));
        Ok(module)
    }

    /// Look up a registered module by name.
    pub fn module(&self, name: &str) -> Option<Arc<ModuleState>> {
        self.modules.read().unwrap().get(name).cloned()
    }
}

/// A named state container with derived getters and change
/// subscriptions.
///
/// Subscribers are called synchronously after every mutation, so a
/// persistence layer hanging off `subscribe` sees writes in call order.
pub struct ModuleState {
    state: RwLock<Container>,
    getters: HashMap<String, Getter>,
    subscribers: RwLock<Vec<Subscriber>>,
}

impl ModuleState {
    /// Create a module seeded with `initial` contents and `getters`.
    pub fn new(initial: Container, getters: HashMap<String, Getter>) -> Self {
        Self {
            state: RwLock::new(initial),
            getters,
            subscribers: RwLock::new(Vec::new()),
        }
    }

    /// Read the container without cloning.
    pub fn read<R>(&self, f: impl FnOnce(&Container) -> R) -> R {
        let state = self.state.read().unwrap();
        f(&state)
    }

    /// Get a clone of one container value.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.state.read().unwrap().get(key).cloned()
    }

    /// Get a clone of the whole container.
    pub fn snapshot(&self) -> Container {
        self.state.read().unwrap().clone()
    }

    /// Replace the whole container and notify subscribers.
    pub fn replace(&self, new_state: Container) {
        *self.state.write().unwrap() = new_state;
        self.notify();
    }

    /// Mutate the container in place and notify subscribers.
    pub fn update(&self, f: impl FnOnce(&mut Container)) {
        {
            let mut state = self.state.write().unwrap();
            f(&mut state);
        }
        self.notify();
    }

    /// Subscribe to container changes.
    ///
    /// The callback runs synchronously after every replace or update.
    pub fn subscribe(&self, callback: impl Fn(&Container) + Send + Sync + 'static) {
        self.subscribers.write().unwrap().push(Box::new(callback));
    }

    /// Evaluate a named getter against the current container.
    pub fn getter(&self, name: &str) -> Option<Value> {
        let getter = self.getters.get(name)?;
        let state = self.state.read().unwrap();
        Some(getter(&state))
    }

    fn notify(&self) {
        let state = self.state.read().unwrap();
        let subscribers = self.subscribers.read().unwrap();
        for subscriber in subscribers.iter() {
            subscriber(&state);
        }
    }
}
