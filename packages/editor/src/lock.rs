//! Background polling of the advisory edit lock.
//!
//! The lock never blocks local edits or saves; it only tells the user that
//! someone else has the page open.

use crate::backend::{LockApi, LockStatus};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Shortest accepted poll interval
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Periodic `get_lock_status` task publishing on a watch channel
#[derive(Debug)]
pub struct LockPoller {
    status: watch::Receiver<LockStatus>,
    handle: Option<JoinHandle<()>>,
}

impl LockPoller {
    /// Start polling; the first poll happens immediately. Must be called
    /// from within a tokio runtime. Intervals below [`MIN_POLL_INTERVAL`]
    /// are raised to it.
    pub fn spawn(api: Arc<dyn LockApi>, document_id: impl Into<String>, interval: Duration) -> Self {
        let document_id = document_id.into();
        let interval = if interval < MIN_POLL_INTERVAL {
            warn!(document_id = %document_id, requested = ?interval, "Lock poll interval too short, clamped");
            MIN_POLL_INTERVAL
        } else {
            interval
        };
        let (tx, rx) = watch::channel(LockStatus::default());

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                match api.get_lock_status(&document_id).await {
                    Ok(status) => {
                        if status.is_locked {
                            debug!(
                                document_id = %document_id,
                                locked_by = ?status.locked_by,
                                "Page is being edited elsewhere"
                            );
                        }
                        tx.send_if_modified(|current| {
                            if *current == status {
                                false
                            } else {
                                *current = status;
                                true
                            }
                        });
                    }
                    // Keep the last known status until the next poll
                    Err(e) => warn!(document_id = %document_id, error = %e, "Lock poll failed"),
                }

                if tx.is_closed() {
                    break;
                }
            }
        });

        Self {
            status: rx,
            handle: Some(handle),
        }
    }

    /// Last polled status
    pub fn status(&self) -> LockStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<LockStatus> {
        self.status.clone()
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Abort the polling task
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            info!("Lock polling stopped");
        }
    }

    /// Abort and wait until the task has gone away
    pub async fn shutdown(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            let _ = handle.await;
        }
    }
}

impl Drop for LockPoller {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
