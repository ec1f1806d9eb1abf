use async_trait::async_trait;
use gatedeck_application::Clipboard;
use tracing::debug;

/// Clipboard for processes without a desktop session.
///
/// Every copy is refused so callers take their manual copy path.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableClipboard;

#[async_trait]
impl Clipboard for UnavailableClipboard {
    async fn copy(&self, text: &str) -> bool {
        debug!(length = text.len(), "no clipboard attached, refusing copy");
        false
    }
}
