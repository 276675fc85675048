use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::{Map, Value};
use shell_logging::{shell_debug, shell_info};

use crate::{KvStore, StoreDir, StoreError, StoreProvider};

/// Opens one JSON file per namespace inside a store directory.
#[derive(Debug, Clone)]
pub struct JsonStoreProvider {
    dir: StoreDir,
}

impl JsonStoreProvider {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir: StoreDir::new(dir),
        }
    }
}

#[async_trait::async_trait]
impl StoreProvider for JsonStoreProvider {
    async fn open(
        &self,
        namespace: &str,
        defaults: Map<String, Value>,
    ) -> Result<Arc<dyn KvStore>, StoreError> {
        let store = JsonFileStore::load(self.dir.clone(), namespace, defaults)?;
        Ok(Arc::new(store))
    }
}

/// A JSON object held in memory and written back atomically on `save`.
#[derive(Debug)]
pub struct JsonFileStore {
    dir: StoreDir,
    namespace: String,
    path: PathBuf,
    values: Mutex<Map<String, Value>>,
}

impl JsonFileStore {
    /// Loads `namespace` from `dir`. A missing document yields `defaults`;
    /// persisted keys override defaults.
    pub fn load(
        dir: StoreDir,
        namespace: &str,
        defaults: Map<String, Value>,
    ) -> Result<Self, StoreError> {
        let path = dir.document(namespace)?;
        let mut values = defaults;
        match dir.read(namespace)? {
            Some(text) => {
                values.extend(parse_object(&path, &text)?);
                shell_info!("Loaded settings store from {:?}", path);
            }
            None => shell_debug!("No settings store at {:?}; starting empty", path),
        }

        Ok(Self {
            dir,
            namespace: namespace.to_string(),
            path,
            values: Mutex::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn values(&self) -> MutexGuard<'_, Map<String, Value>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait::async_trait]
impl KvStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.values().get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.values().insert(key.to_string(), value);
        Ok(())
    }

    async fn save(&self) -> Result<(), StoreError> {
        let snapshot = self.values().clone();
        self.dir.replace(&self.namespace, &snapshot)?;
        shell_debug!("Saved settings store to {:?}", self.path);
        Ok(())
    }
}

fn parse_object(path: &Path, text: &str) -> Result<Map<String, Value>, StoreError> {
    let corrupt = |reason: String| StoreError::Corrupt {
        path: path.display().to_string(),
        reason,
    };
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(corrupt("expected a JSON object".to_string())),
        Err(err) => Err(corrupt(err.to_string())),
    }
}
