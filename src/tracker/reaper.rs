//! Background reaper loop
//!
//! One reaper task runs per tracker. It is the sole consumer of the
//! reclamation queue: each notification resolves to a tracked entry, the
//! entry leaves the live set, and its strategy runs. A failed deletion is
//! recorded and the loop continues; the reaper stops once the live set has
//! drained after a shutdown request, or once the tracker itself is gone.
//!
//! The task holds only a weak reference to the tracker state. The tracker
//! owns the reaper, never the other way around, so dropping the last tracker
//! handle ends the task instead of parking it on the queue forever.

use std::sync::Weak;

use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info, warn};

use super::{DeleteFailure, TrackerInner};

/// Messages carried by the reclamation queue.
#[derive(Debug)]
pub(super) enum ReaperEvent {
    /// The marker holding this token has been dropped everywhere.
    Reclaimed(u64),
    /// Wake-up from `exit_when_finished`; carries no work of its own.
    Shutdown,
}

pub(super) async fn run(tracker: Weak<TrackerInner>, mut queue: UnboundedReceiver<ReaperEvent>) {
    while let Some(event) = queue.recv().await {
        let inner = match tracker.upgrade() {
            Some(inner) => inner,
            None => {
                debug!("tracker dropped; reaper stopping");
                return;
            }
        };

        if let ReaperEvent::Reclaimed(token) = event {
            // Remove before deleting so the entry cannot be processed twice;
            // the lock is released before any filesystem work.
            let entry = inner.state.lock().await.entries.remove(&token);

            match entry {
                Some(entry) => {
                    debug!(
                        path = %entry.path().display(),
                        token,
                        "marker reclaimed; deleting tracked path"
                    );
                    if let Err(e) = entry.strategy().delete(entry.path()).await {
                        warn!(
                            path = %entry.path().display(),
                            error = %e,
                            "deferred deletion failed"
                        );
                        inner.failures.lock().await.push(DeleteFailure {
                            path: entry.path().to_path_buf(),
                            cause: e.to_string(),
                        });
                    }
                }
                None => {
                    debug!(token, "reclamation for a token with no live entry");
                }
            }
        }

        let mut state = inner.state.lock().await;
        if state.exit_when_finished && state.entries.is_empty() {
            state.reaper = None;
            info!("live set drained after shutdown request; reaper stopping");
            return;
        }
    }

    // Queue closed: every outstanding marker is gone and the tracker's own
    // sender was dropped with its state.
    debug!("reclamation queue closed; reaper stopping");
}
