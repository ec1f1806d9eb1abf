//! Application services and ports for tabular console views.

#![forbid(unsafe_code)]

mod column_visibility;
mod fetch_coordinator;
mod modal_orchestrator;
mod preference_store;
mod query_builder;
mod view_controller;
mod view_ports;

pub use column_visibility::ColumnVisibilityManager;
pub use fetch_coordinator::{FetchCoordinator, FetchOutcome, FetchPhase, FetchTicket, ViewState};
pub use modal_orchestrator::{ModalOrchestrator, ModalState};
pub use preference_store::PreferenceStore;
pub use query_builder::{QueryBuilder, default_window};
pub use view_controller::{CopyOutcome, TableViewController, ViewControllerPorts};
pub use view_ports::{
    Clipboard, Clock, IdentityProvider, ListDataSource, ListEnvelope, ListPayload, ListRequest,
    Notifier, PreferenceStorage,
};
