//! Shared primitives for all Rust crates in Gatedeck.

#![forbid(unsafe_code)]

/// Identity and role primitives shared across services.
pub mod auth;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use auth::{RoleClass, UserIdentity};

/// Result type used across Gatedeck crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

impl std::fmt::Display for NonEmptyString {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Common application error categories.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Caller role is not allowed to reach a resource or endpoint.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Network or protocol failure while talking to the data source.
    #[error("transport error: {0}")]
    Transport(String),

    /// Data source answered with an explicit failure indicator.
    #[error("server error: {0}")]
    Server(String),

    /// Durable preference storage is unavailable or rejected an operation.
    #[error("storage error: {0}")]
    Storage(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the bare message without the category prefix.
    ///
    /// This is the text handed to user-facing notification surfaces.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Validation(message)
            | Self::Forbidden(message)
            | Self::Transport(message)
            | Self::Server(message)
            | Self::Storage(message)
            | Self::Internal(message) => message.as_str(),
        }
    }
}
