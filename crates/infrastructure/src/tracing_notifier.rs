//! Notifier that writes user-facing messages to tracing output.

use gatedeck_application::Notifier;
use tracing::{info, warn};

/// Notifier for headless consoles.
#[derive(Debug, Clone, Default)]
pub struct TracingNotifier;

impl TracingNotifier {
    /// Creates a new tracing notifier.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Notifier for TracingNotifier {
    fn report_error(&self, message: &str) {
        warn!(message = message, "notification: error");
    }

    fn report_success(&self, message: &str) {
        info!(message = message, "notification: success");
    }
}
