use std::collections::BTreeMap;

use gatedeck_domain::{ModalKind, ModalPayload};

/// Open state of one secondary dialog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModalState {
    visible: bool,
    payload: Option<ModalPayload>,
}

impl ModalState {
    /// Returns whether the dialog is shown.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Returns the payload the dialog was opened with.
    #[must_use]
    pub fn payload(&self) -> Option<&ModalPayload> {
        self.payload.as_ref()
    }
}

/// Tracks independent open state per dialog kind.
#[derive(Debug, Clone, Default)]
pub struct ModalOrchestrator {
    modals: BTreeMap<ModalKind, ModalState>,
}

impl ModalOrchestrator {
    /// Creates an orchestrator with every dialog closed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a dialog, replacing any payload it held.
    pub fn open(&mut self, kind: ModalKind, payload: Option<ModalPayload>) {
        self.modals.insert(
            kind,
            ModalState {
                visible: true,
                payload,
            },
        );
    }

    /// Closes a dialog and drops its payload.
    pub fn close(&mut self, kind: ModalKind) {
        self.modals.remove(&kind);
    }

    /// Returns the state of one dialog kind.
    #[must_use]
    pub fn state(&self, kind: ModalKind) -> ModalState {
        self.modals.get(&kind).cloned().unwrap_or_default()
    }

    /// Returns whether a dialog kind is open.
    #[must_use]
    pub fn is_open(&self, kind: ModalKind) -> bool {
        self.modals.get(&kind).is_some_and(|state| state.visible)
    }

    /// Returns every open dialog kind in stable order.
    #[must_use]
    pub fn open_kinds(&self) -> Vec<ModalKind> {
        self.modals
            .iter()
            .filter(|(_, state)| state.visible)
            .map(|(kind, _)| *kind)
            .collect()
    }
}
