use gatedeck_domain::{DisplayRecord, ModalKind, ModalPayload};
use tracing::{debug, warn};

use super::TableViewController;
use crate::ModalState;

/// Result of a copy request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    /// The clipboard accepted the text.
    Copied,
    /// The clipboard refused; the manual copy dialog is open instead.
    ManualFallback,
}

impl TableViewController {
    /// Opens the text detail dialog.
    pub fn open_content_modal(&self, content: impl Into<String>) {
        self.open_modal(
            ModalKind::ContentDetail,
            Some(ModalPayload::Text(content.into())),
        );
    }

    /// Opens the media preview dialog.
    pub fn open_media_modal(&self, url: impl Into<String>) {
        self.open_modal(
            ModalKind::MediaPreview,
            Some(ModalPayload::MediaUrl(url.into())),
        );
    }

    /// Opens the editor for one row.
    pub fn open_record_editor(&self, record: DisplayRecord) {
        self.open_modal(
            ModalKind::RecordEditor,
            Some(ModalPayload::Record(Box::new(record))),
        );
    }

    /// Opens the column picker.
    pub fn open_column_selector(&self) {
        self.open_modal(ModalKind::ColumnSelector, None);
    }

    /// Closes one dialog and drops its payload.
    pub fn close_modal(&self, kind: ModalKind) {
        self.lock_state().modals.close(kind);
    }

    /// Returns the state of one dialog.
    #[must_use]
    pub fn modal(&self, kind: ModalKind) -> ModalState {
        self.lock_state().modals.state(kind)
    }

    /// Returns every open dialog kind.
    #[must_use]
    pub fn open_modals(&self) -> Vec<ModalKind> {
        self.lock_state().modals.open_kinds()
    }

    /// Copies text, falling back to the manual copy dialog.
    pub async fn copy_text(&self, text: &str) -> CopyOutcome {
        if self.clipboard.copy(text).await {
            self.notifier.report_success(&format!("Copied: {text}"));
            return CopyOutcome::Copied;
        }

        warn!("clipboard rejected copy, opening manual copy dialog");
        self.open_modal(
            ModalKind::ManualCopy,
            Some(ModalPayload::Text(text.to_owned())),
        );
        CopyOutcome::ManualFallback
    }

    fn open_modal(&self, kind: ModalKind, payload: Option<ModalPayload>) {
        debug!(modal = kind.as_str(), "opening modal");
        self.lock_state().modals.open(kind, payload);
    }
}
