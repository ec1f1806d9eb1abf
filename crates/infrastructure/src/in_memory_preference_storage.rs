use std::collections::HashMap;

use async_trait::async_trait;
use gatedeck_application::PreferenceStorage;
use gatedeck_core::AppResult;
use tokio::sync::RwLock;

/// Process-local preference storage.
#[derive(Default)]
pub struct InMemoryPreferenceStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryPreferenceStorage {
    /// Creates empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PreferenceStorage for InMemoryPreferenceStorage {
    async fn read(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn write(&self, key: &str, value: String) -> AppResult<()> {
        self.entries.write().await.insert(key.to_owned(), value);
        Ok(())
    }
}
