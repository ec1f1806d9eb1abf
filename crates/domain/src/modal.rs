use serde::{Deserialize, Serialize};

use crate::DisplayRecord;

/// Secondary dialog kinds a tabular view can mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModalKind {
    /// Long text detail such as a failure reason or raw payload.
    ContentDetail,
    /// Media preview for a generated result URL.
    MediaPreview,
    /// Column visibility picker.
    ColumnSelector,
    /// Editor bound to one row.
    RecordEditor,
    /// Manual copy surface shown when the clipboard is unavailable.
    ManualCopy,
}

impl ModalKind {
    /// Returns the stable identifier.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ContentDetail => "content_detail",
            Self::MediaPreview => "media_preview",
            Self::ColumnSelector => "column_selector",
            Self::RecordEditor => "record_editor",
            Self::ManualCopy => "manual_copy",
        }
    }
}

/// Data handed to a modal when it opens.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ModalPayload {
    /// Plain text content.
    Text(String),
    /// Media URL to preview.
    MediaUrl(String),
    /// One table row.
    Record(Box<DisplayRecord>),
}
