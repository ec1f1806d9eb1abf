use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use gatedeck_core::{AppError, AppResult, UserIdentity};
use gatedeck_domain::ListRecord;
use serde::{Deserialize, Serialize};

/// One list request ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    /// Endpoint path selected for the caller's role.
    pub endpoint: String,
    /// Query parameters in transport order.
    pub parameters: Vec<(String, String)>,
}

impl ListRequest {
    /// Returns one query parameter value.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Page payload returned by a list endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListPayload {
    /// Records on the page.
    #[serde(default)]
    pub items: Option<Vec<ListRecord>>,
    /// Total number of records matching the filters.
    #[serde(default)]
    pub total: Option<i64>,
    /// Page the server resolved.
    #[serde(default)]
    pub page: Option<i64>,
    /// Page size the server resolved.
    #[serde(default)]
    pub page_size: Option<i64>,
}

impl ListPayload {
    /// Creates a fully populated payload.
    #[must_use]
    pub fn new(items: Vec<ListRecord>, total: i64, page: i64, page_size: i64) -> Self {
        Self {
            items: Some(items),
            total: Some(total),
            page: Some(page),
            page_size: Some(page_size),
        }
    }
}

/// Response envelope shared by every console list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListEnvelope {
    /// Whether the server handled the request.
    pub success: bool,
    /// Failure message when `success` is false.
    #[serde(default)]
    pub message: String,
    /// Page payload when `success` is true.
    #[serde(default)]
    pub data: Option<ListPayload>,
}

impl ListEnvelope {
    /// Creates a successful envelope.
    #[must_use]
    pub fn success(payload: ListPayload) -> Self {
        Self {
            success: true,
            message: String::new(),
            data: Some(payload),
        }
    }

    /// Creates a failed envelope.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }

    /// Unwraps the payload, turning a server-reported failure into an error.
    pub fn into_payload(self) -> AppResult<ListPayload> {
        if !self.success {
            return Err(AppError::Server(self.message));
        }

        Ok(self.data.unwrap_or_default())
    }
}

/// Port for the paginated list endpoint.
#[async_trait]
pub trait ListDataSource: Send + Sync {
    /// Fetches one page.
    async fn fetch_page(&self, request: ListRequest) -> AppResult<ListEnvelope>;
}

/// Port for string-valued durable key-value storage.
#[async_trait]
pub trait PreferenceStorage: Send + Sync {
    /// Reads a raw value.
    async fn read(&self, key: &str) -> AppResult<Option<String>>;

    /// Writes a raw value, replacing any previous one.
    async fn write(&self, key: &str, value: String) -> AppResult<()>;
}

/// Port for user-facing toast notifications.
pub trait Notifier: Send + Sync {
    /// Shows an error message.
    fn report_error(&self, message: &str);

    /// Shows a success message.
    fn report_success(&self, message: &str);
}

/// Port for the system clipboard.
#[async_trait]
pub trait Clipboard: Send + Sync {
    /// Copies text, returning whether the clipboard accepted it.
    async fn copy(&self, text: &str) -> bool;
}

/// Port for the signed-in user.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Returns the identity of the current session.
    async fn current_identity(&self) -> AppResult<UserIdentity>;
}

/// Port for wall-clock time in the console's display offset.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<FixedOffset>;
}
