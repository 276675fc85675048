use std::sync::Arc;

use shell_core::{InitialTheme, THEME_PREFERENCE_KEY};
use shell_engine::{ConfigStore, StoreError, StoreProvider};
use shell_logging::{shell_debug, shell_info};

/// Reads, seeds and writes the persisted theme preference.
///
/// The store is opened on first use and kept open for the rest of the run.
pub struct ThemeCoordinator {
    provider: Option<Arc<dyn StoreProvider>>,
    namespace: String,
    default_theme: String,
    store: Option<ConfigStore>,
}

impl ThemeCoordinator {
    pub fn new(
        provider: Option<Arc<dyn StoreProvider>>,
        namespace: impl Into<String>,
        default_theme: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            namespace: namespace.into(),
            default_theme: default_theme.into(),
            store: None,
        }
    }

    /// Returns the stored theme, or writes the default back when none is stored.
    pub async fn initialize(&mut self) -> Result<InitialTheme, StoreError> {
        let store = self.store().await?;
        if let Some(saved) = store.get_string(THEME_PREFERENCE_KEY).await? {
            shell_info!("Using stored theme {}", saved);
            return Ok(InitialTheme::Stored(saved));
        }

        store
            .set(THEME_PREFERENCE_KEY, self.default_theme.clone())
            .await?;
        store.save().await?;
        shell_info!("Seeded theme preference with {}", self.default_theme);
        Ok(InitialTheme::Defaulted(self.default_theme.clone()))
    }

    pub async fn persist(&mut self, name: &str) -> Result<(), StoreError> {
        let store = self.store().await?;
        store.set(THEME_PREFERENCE_KEY, name).await?;
        store.save().await?;
        shell_debug!("Persisted theme {}", name);
        Ok(())
    }

    async fn store(&mut self) -> Result<ConfigStore, StoreError> {
        if let Some(store) = &self.store {
            return Ok(store.clone());
        }
        let store = ConfigStore::open(self.provider.as_deref(), &self.namespace).await?;
        self.store = Some(store.clone());
        Ok(store)
    }
}
