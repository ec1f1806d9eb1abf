use std::sync::Arc;

use gatedeck_domain::PreferenceKey;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::PreferenceStorage;

/// Typed access to persisted view preferences.
///
/// Reads never fail: unavailable storage and unreadable entries both
/// resolve to `None` so callers fall back to computed defaults.
#[derive(Clone)]
pub struct PreferenceStore {
    storage: Arc<dyn PreferenceStorage>,
}

impl PreferenceStore {
    /// Creates a preference store over a storage port.
    #[must_use]
    pub fn new(storage: Arc<dyn PreferenceStorage>) -> Self {
        Self { storage }
    }

    /// Loads and decodes a preference.
    pub async fn load<T: DeserializeOwned>(&self, key: &PreferenceKey) -> Option<T> {
        let raw = match self.storage.read(key.as_str()).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(error) => {
                warn!(key = %key, error = %error, "preference storage unavailable, using defaults");
                return None;
            }
        };

        match serde_json::from_str(raw.as_str()) {
            Ok(value) => Some(value),
            Err(error) => {
                warn!(key = %key, error = %error, "discarding unreadable preference entry");
                None
            }
        }
    }

    /// Encodes and stores a preference, overwriting any previous value.
    ///
    /// Failures are logged and otherwise ignored.
    pub async fn save<T: Serialize + ?Sized>(&self, key: &PreferenceKey, value: &T) {
        let encoded = match serde_json::to_string(value) {
            Ok(encoded) => encoded,
            Err(error) => {
                warn!(key = %key, error = %error, "failed to encode preference");
                return;
            }
        };

        if let Err(error) = self.storage.write(key.as_str(), encoded).await {
            warn!(key = %key, error = %error, "failed to persist preference");
        }
    }
}
