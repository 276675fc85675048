use std::sync::Arc;

use serde_json::{Map, Value};
use shell_logging::shell_debug;

use crate::{KvStore, StoreError, StoreProvider};

/// Typed wrapper over an optional key-value capability.
///
/// Without a backing store every read is absent and every write succeeds
/// without effect, so callers only ever apply defaults in memory.
#[derive(Clone)]
pub struct ConfigStore {
    inner: Option<Arc<dyn KvStore>>,
}

impl ConfigStore {
    pub async fn open(
        provider: Option<&dyn StoreProvider>,
        namespace: &str,
    ) -> Result<Self, StoreError> {
        match provider {
            Some(provider) => {
                let inner = provider.open(namespace, Map::new()).await?;
                shell_debug!("Opened config store namespace={}", namespace);
                Ok(Self { inner: Some(inner) })
            }
            None => Ok(Self::detached()),
        }
    }

    pub fn detached() -> Self {
        Self { inner: None }
    }

    pub fn is_detached(&self) -> bool {
        self.inner.is_none()
    }

    pub async fn get(&self, name: &str) -> Result<Option<Value>, StoreError> {
        match &self.inner {
            Some(store) => store.get(name).await,
            None => Ok(None),
        }
    }

    /// Non-empty string value of `name`, if any. Other value types read as absent.
    pub async fn get_string(&self, name: &str) -> Result<Option<String>, StoreError> {
        let value = self.get(name).await?;
        Ok(match value {
            Some(Value::String(text)) if !text.is_empty() => Some(text),
            _ => None,
        })
    }

    pub async fn set(&self, name: &str, value: impl Into<Value> + Send) -> Result<(), StoreError> {
        match &self.inner {
            Some(store) => store.set(name, value.into()).await,
            None => Ok(()),
        }
    }

    pub async fn save(&self) -> Result<(), StoreError> {
        match &self.inner {
            Some(store) => store.save().await,
            None => Ok(()),
        }
    }
}
