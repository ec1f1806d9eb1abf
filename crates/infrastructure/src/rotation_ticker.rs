//! Timer-driven rotation of a highlighted item.

use std::sync::Arc;
use std::time::Duration;

use gatedeck_core::{AppError, AppResult};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Rotation period of the home page endpoint list.
pub const DEFAULT_ROTATION_PERIOD: Duration = Duration::from_millis(3000);

/// Advances an index over `len` items on a fixed period.
///
/// The background task is aborted when the ticker is dropped, so a view that
/// owns a ticker leaves no timer behind when it goes away.
pub struct RotationTicker {
    len: usize,
    index: Arc<watch::Sender<usize>>,
    task: JoinHandle<()>,
}

impl RotationTicker {
    /// Starts rotating on the current tokio runtime.
    pub fn start(len: usize, period: Duration) -> AppResult<Self> {
        if len == 0 {
            return Err(AppError::Validation(
                "rotation needs at least one item".to_owned(),
            ));
        }
        if period.is_zero() {
            return Err(AppError::Validation(
                "rotation period must be positive".to_owned(),
            ));
        }

        let (sender, _) = watch::channel(0_usize);
        let index = Arc::new(sender);
        let task = tokio::spawn({
            let index = Arc::clone(&index);
            async move {
                let mut interval = tokio::time::interval(period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                interval.tick().await;
                loop {
                    interval.tick().await;
                    index.send_modify(|current| *current = (*current + 1) % len);
                }
            }
        });

        Ok(Self { len, index, task })
    }

    /// Returns the highlighted index.
    #[must_use]
    pub fn current(&self) -> usize {
        *self.index.borrow()
    }

    /// Jumps to an index, wrapping past the end.
    pub fn select(&self, index: usize) {
        self.index.send_replace(index % self.len);
    }

    /// Returns a receiver notified on every change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.index.subscribe()
    }
}

impl Drop for RotationTicker {
    fn drop(&mut self) {
        self.task.abort();
    }
}
