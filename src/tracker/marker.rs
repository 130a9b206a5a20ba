//! Ownership markers that trigger deferred deletion

use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

use super::reaper::ReaperEvent;

/// Cloneable handle whose lifetime governs a tracked path.
///
/// The tracker keeps no clone, so once every caller-held clone is dropped
/// the path's reclamation notification is pushed to the reaper exactly once.
/// Dropping a marker never blocks and works on any thread.
#[derive(Debug, Clone)]
pub struct Marker {
    inner: Arc<MarkerInner>,
}

impl Marker {
    pub(super) fn new(token: u64, queue: UnboundedSender<ReaperEvent>) -> Self {
        Self {
            inner: Arc::new(MarkerInner { token, queue }),
        }
    }

    /// Opaque registration token, stable across clones.
    pub fn token(&self) -> u64 {
        self.inner.token
    }
}

#[derive(Debug)]
struct MarkerInner {
    token: u64,
    queue: UnboundedSender<ReaperEvent>,
}

impl Drop for MarkerInner {
    fn drop(&mut self) {
        // Send fails only when the reaper is already gone.
        let _ = self.queue.send(ReaperEvent::Reclaimed(self.token));
    }
}
