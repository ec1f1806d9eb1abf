//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod http_list_data_source;
mod in_memory_preference_storage;
mod redis_preference_storage;
mod rotation_ticker;
mod static_identity_provider;
mod system_clock;
mod tracing_notifier;
mod unavailable_clipboard;

pub use http_list_data_source::{HttpListDataSource, USER_ID_HEADER};
pub use in_memory_preference_storage::InMemoryPreferenceStorage;
pub use redis_preference_storage::RedisPreferenceStorage;
pub use rotation_ticker::{DEFAULT_ROTATION_PERIOD, RotationTicker};
pub use static_identity_provider::StaticIdentityProvider;
pub use system_clock::SystemClock;
pub use tracing_notifier::TracingNotifier;
pub use unavailable_clipboard::UnavailableClipboard;
