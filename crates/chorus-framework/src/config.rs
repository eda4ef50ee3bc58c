//! Layered module configuration.
//!
//! Every module reads its options through a [`ConfigResolver`], which combines
//! two kinds of layers:
//!
//! - **Defaults**: mappings folded together once at construction. The first
//!   layer to set a key keeps it; later layers only fill in missing keys.
//! - **Locations**: `(namespace, name)` pairs naming a section of the shared
//!   [`ConfigStore`]. The most recently registered location is consulted
//!   first, so a module-specific section shadows the shared one.
//!
//! ```text
//! store
//! ├── chorus
//! │   └── base_responder   { "command_prefix": "!" }
//! └── fun
//!     └── echo             { "command_prefix": "?" }   <- consulted first
//! ```
//!
//! Keys may be dotted (`"limits.per_channel"`) to reach nested objects.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, trace, warn};

use crate::error::{ConfigKeyError, ConfigResult};

/// Shared nested `namespace -> name -> key -> value` configuration store.
///
/// Cloning is cheap; all clones see the same data.
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    inner: Arc<RwLock<Value>>,
}

impl ConfigStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store from an already loaded value.
    pub fn from_value(value: Value) -> Self {
        Self {
            inner: Arc::new(RwLock::new(value)),
        }
    }

    /// Returns a copy of the section stored under `namespace.name`.
    pub fn get_for_module(&self, namespace: &str, name: &str) -> Option<Value> {
        let root = self.inner.read();
        root.get(namespace)?.get(name).cloned()
    }

    /// Looks up a (possibly dotted) key inside `namespace.name`.
    pub fn lookup(&self, namespace: &str, name: &str, key: &str) -> Option<Value> {
        let root = self.inner.read();
        let section = root.get(namespace)?.get(name)?;
        lookup_path(section, key).cloned()
    }

    /// Sets a (possibly dotted) key inside `namespace.name`, creating
    /// intermediate objects as needed.
    pub fn set(&self, namespace: &str, name: &str, key: &str, value: Value) -> ConfigResult<()> {
        let mut root = self.inner.write();
        let slot = slot_mut(&mut root, namespace, name, key)?;
        *slot = value;
        Ok(())
    }

    /// Appends `value` to the array stored under a (possibly dotted) key,
    /// creating the array if the key is unset.
    pub fn append(&self, namespace: &str, name: &str, key: &str, value: Value) -> ConfigResult<()> {
        let mut root = self.inner.write();
        let slot = slot_mut(&mut root, namespace, name, key)?;
        if slot.is_null() {
            *slot = Value::Array(Vec::new());
        }
        match slot {
            Value::Array(items) => {
                items.push(value);
                Ok(())
            }
            _ => Err(ConfigKeyError::invalid_type(key, "not an array")),
        }
    }

    /// Returns a copy of the whole store.
    pub fn snapshot(&self) -> Value {
        self.inner.read().clone()
    }
}

/// Resolves option lookups for one module instance.
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    store: ConfigStore,
    defaults: Map<String, Value>,
    locations: Vec<(String, String)>,
}

impl ConfigResolver {
    /// Creates a resolver with no defaults and no locations.
    pub fn new(store: ConfigStore) -> Self {
        Self {
            store,
            defaults: Map::new(),
            locations: Vec::new(),
        }
    }

    /// Folds a default layer into the default table.
    ///
    /// Keys already set by an earlier layer are kept. Non-object layers are
    /// ignored.
    pub fn register_defaults(&mut self, layer: Value) {
        match layer {
            Value::Object(map) => fill_missing(&mut self.defaults, map),
            Value::Null => {}
            other => warn!(layer = %other, "Ignoring non-object default config layer"),
        }
    }

    /// Declares that live configuration is read from `namespace.name`.
    ///
    /// Registering the same pair again has no effect.
    pub fn register_config(&mut self, namespace: impl Into<String>, name: impl Into<String>) {
        let entry = (namespace.into(), name.into());
        if self.locations.contains(&entry) {
            trace!(namespace = %entry.0, name = %entry.1, "Config location already registered");
            return;
        }
        debug!(namespace = %entry.0, name = %entry.1, "Registered config location");
        self.locations.push(entry);
    }

    /// Returns the registered locations in registration order.
    pub fn locations(&self) -> &[(String, String)] {
        &self.locations
    }

    /// Returns the merged default table.
    pub fn defaults(&self) -> &Map<String, Value> {
        &self.defaults
    }

    /// Returns the shared store.
    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    /// Resolves `key`, preferring live configuration over the defaults.
    pub fn get(&self, key: &str) -> ConfigResult<Value> {
        for (namespace, name) in self.locations.iter().rev() {
            if let Some(value) = self.store.lookup(namespace, name, key) {
                return Ok(value);
            }
        }
        let mut parts = key.splitn(2, '.');
        let head = parts.next().unwrap_or(key);
        let found = match parts.next() {
            Some(rest) => self.defaults.get(head).and_then(|v| lookup_path(v, rest)),
            None => self.defaults.get(head),
        };
        found.cloned().ok_or_else(|| ConfigKeyError::not_found(key))
    }

    /// Resolves `key` and deserializes it into `T`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> ConfigResult<T> {
        let value = self.get(key)?;
        serde_json::from_value(value).map_err(|e| ConfigKeyError::invalid_type(key, e.to_string()))
    }

    /// Resolves `key` into `T`, or returns `default` if it is set nowhere.
    ///
    /// A value of the wrong type is still an error.
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> ConfigResult<T> {
        match self.get_as(key) {
            Err(ConfigKeyError::NotFound { .. }) => Ok(default),
            other => other,
        }
    }

    /// Resolves `key` as a string.
    pub fn get_str(&self, key: &str) -> ConfigResult<String> {
        match self.get(key)? {
            Value::String(s) => Ok(s),
            other => Err(ConfigKeyError::invalid_type(
                key,
                format!("expected a string, got {other}"),
            )),
        }
    }

    /// Writes `key` into the most recently registered location.
    pub fn set(&self, key: &str, value: Value) -> ConfigResult<()> {
        let (namespace, name) = self.write_location(key)?;
        self.store.set(namespace, name, key, value)
    }

    /// Appends to the array under `key` in the most recently registered
    /// location.
    pub fn append(&self, key: &str, value: Value) -> ConfigResult<()> {
        let (namespace, name) = self.write_location(key)?;
        self.store.append(namespace, name, key, value)
    }

    fn write_location(&self, key: &str) -> ConfigResult<(&str, &str)> {
        self.locations
            .last()
            .map(|(namespace, name)| (namespace.as_str(), name.as_str()))
            .ok_or_else(|| ConfigKeyError::NoLocation {
                key: key.to_string(),
            })
    }
}

fn lookup_path<'a>(mut value: &'a Value, key: &str) -> Option<&'a Value> {
    for segment in key.split('.') {
        value = value.as_object()?.get(segment)?;
    }
    Some(value)
}

fn slot_mut<'a>(
    root: &'a mut Value,
    namespace: &str,
    name: &str,
    key: &str,
) -> ConfigResult<&'a mut Value> {
    let path = [namespace, name].into_iter().chain(key.split('.'));
    let mut current = root;
    for segment in path {
        if current.is_null() {
            *current = Value::Object(Map::new());
        }
        current = match current {
            Value::Object(map) => map.entry(segment).or_insert(Value::Null),
            _ => {
                return Err(ConfigKeyError::invalid_type(
                    key,
                    format!("'{segment}' is nested under a non-object value"),
                ));
            }
        };
    }
    Ok(current)
}

fn fill_missing(target: &mut Map<String, Value>, layer: Map<String, Value>) {
    for (key, value) in layer {
        match (target.get_mut(&key), value) {
            (None, value) => {
                target.insert(key, value);
            }
            (Some(Value::Object(existing)), Value::Object(nested)) => {
                fill_missing(existing, nested);
            }
            (Some(_), _) => {}
        }
    }
}
