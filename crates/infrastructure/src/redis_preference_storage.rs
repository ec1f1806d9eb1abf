//! Redis-backed preference storage.

use async_trait::async_trait;
use gatedeck_application::PreferenceStorage;
use gatedeck_core::{AppError, AppResult};
use redis::AsyncCommands;

/// Redis implementation of the preference storage port.
#[derive(Clone)]
pub struct RedisPreferenceStorage {
    client: redis::Client,
    key_prefix: String,
}

impl RedisPreferenceStorage {
    /// Creates a storage adapter with a configured Redis client and key prefix.
    #[must_use]
    pub fn new(client: redis::Client, key_prefix: impl Into<String>) -> Self {
        Self {
            client,
            key_prefix: key_prefix.into(),
        }
    }

    fn key_for(&self, key: &str) -> String {
        format!("{}:{key}", self.key_prefix)
    }

    async fn connection(&self) -> AppResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|error| AppError::Storage(format!("failed to connect to redis: {error}")))
    }
}

#[async_trait]
impl PreferenceStorage for RedisPreferenceStorage {
    async fn read(&self, key: &str) -> AppResult<Option<String>> {
        let mut connection = self.connection().await?;
        connection
            .get::<_, Option<String>>(self.key_for(key))
            .await
            .map_err(|error| {
                AppError::Storage(format!("failed to read preference '{key}': {error}"))
            })
    }

    async fn write(&self, key: &str, value: String) -> AppResult<()> {
        let mut connection = self.connection().await?;
        connection
            .set::<_, _, ()>(self.key_for(key), value)
            .await
            .map_err(|error| {
                AppError::Storage(format!("failed to write preference '{key}': {error}"))
            })
    }
}
