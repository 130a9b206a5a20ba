//! Deferred filesystem cleanup tracking
//!
//! A [`CleanupTracker`] associates the lifetime of a [`Marker`] handle with
//! the deletion of a filesystem path. Callers register a path and receive a
//! cloneable marker; once the last clone is dropped, a single background
//! reaper task deletes the path with the strategy registered for it. No
//! explicit close or delete call is needed at any call site.

pub mod marker;
mod reaper;


pub use marker::Marker;

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::Lazy;
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::strategy::DeleteStrategy;
use reaper::ReaperEvent;

/// An immutable path/strategy pair created at registration time.
#[derive(Debug, Clone)]
pub struct TrackedEntry {
    path: PathBuf,
    strategy: DeleteStrategy,
}

impl TrackedEntry {
    /// The filesystem path this entry will delete.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The strategy used to delete it.
    pub fn strategy(&self) -> DeleteStrategy {
        self.strategy
    }
}

/// A deletion the reaper attempted and could not complete.
#[derive(Debug, Clone)]
pub struct DeleteFailure {
    /// Path whose deletion failed.
    pub path: PathBuf,
    /// Rendered cause of the failure.
    pub cause: String,
}

impl fmt::Display for DeleteFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.cause)
    }
}

/// Handle to the running reaper task.
struct ReaperHandle {
    queue: UnboundedSender<ReaperEvent>,
    task: JoinHandle<()>,
}

/// Mutable tracker state, guarded by one lock.
struct TrackerState {
    entries: HashMap<u64, TrackedEntry>,
    next_token: u64,
    exit_when_finished: bool,
    reaper: Option<ReaperHandle>,
}

/// State shared between the public tracker and its reaper task.
struct TrackerInner {
    state: Mutex<TrackerState>,
    failures: Mutex<Vec<DeleteFailure>>,
    default_strategy: DeleteStrategy,
}

/// Registry of paths awaiting deferred deletion.
///
/// The tracker holds no clone of any marker it hands out, so a marker's
/// lifetime is governed entirely by its callers. One reaper task is started
/// lazily on the first registration and stops once
/// [`exit_when_finished`](CleanupTracker::exit_when_finished) has been called
/// and every tracked path has drained.
///
/// Cloning the tracker clones a handle to the same registry. The reaper
/// holds only a weak reference to it: dropping the last handle abandons
/// tracking — outstanding markers become inert and the reaper exits without
/// deleting their paths. Keep a handle alive (or use
/// [`default_tracker`]) for as long as deferred deletions must still happen.
#[derive(Clone)]
pub struct CleanupTracker {
    inner: Arc<TrackerInner>,
}

impl Default for CleanupTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl CleanupTracker {
    /// Create a tracker whose default strategy is [`DeleteStrategy::Normal`].
    pub fn new() -> Self {
        Self::with_default_strategy(DeleteStrategy::Normal)
    }

    /// Create a tracker with a different default strategy for
    /// [`track_with_default`](CleanupTracker::track_with_default).
    pub fn with_default_strategy(strategy: DeleteStrategy) -> Self {
        Self {
            inner: Arc::new(TrackerInner {
                state: Mutex::new(TrackerState {
                    entries: HashMap::new(),
                    next_token: 0,
                    exit_when_finished: false,
                    reaper: None,
                }),
                failures: Mutex::new(Vec::new()),
                default_strategy: strategy,
            }),
        }
    }

    /// Register `path` for deletion with `strategy` once the returned
    /// [`Marker`] (and every clone of it) has been dropped.
    ///
    /// Fails with [`Error::InvalidArgument`] on an empty path and with
    /// [`Error::TrackerStopped`] once
    /// [`exit_when_finished`](CleanupTracker::exit_when_finished) has been
    /// called. The first successful registration starts the reaper task, so
    /// this must run inside a tokio runtime.
    pub async fn track(
        &self,
        path: impl Into<PathBuf>,
        strategy: DeleteStrategy,
    ) -> Result<Marker> {
        let path = path.into();
        if path.as_os_str().is_empty() {
            return Err(Error::InvalidArgument(
                "cannot track an empty path".to_string(),
            ));
        }

        let mut state = self.inner.state.lock().await;
        if state.exit_when_finished {
            return Err(Error::TrackerStopped);
        }

        let queue = match &state.reaper {
            Some(handle) => handle.queue.clone(),
            None => {
                let (tx, rx) = mpsc::unbounded_channel();
                let task = tokio::spawn(reaper::run(Arc::downgrade(&self.inner), rx));
                state.reaper = Some(ReaperHandle {
                    queue: tx.clone(),
                    task,
                });
                debug!("reaper started");
                tx
            }
        };

        let token = state.next_token;
        state.next_token += 1;
        state.entries.insert(token, TrackedEntry { path: path.clone(), strategy });

        debug!(
            path = %path.display(),
            ?strategy,
            token,
            live = state.entries.len(),
            "tracking path for deferred deletion"
        );

        Ok(Marker::new(token, queue))
    }

    /// [`track`](CleanupTracker::track) with this tracker's default strategy.
    pub async fn track_with_default(&self, path: impl Into<PathBuf>) -> Result<Marker> {
        let strategy = self.inner.default_strategy;
        self.track(path, strategy).await
    }

    /// Number of paths currently awaiting reclamation.
    pub async fn track_count(&self) -> usize {
        self.inner.state.lock().await.entries.len()
    }

    /// Snapshot of every deletion failure the reaper has recorded so far.
    ///
    /// The underlying list is append-only and safe to poll while the reaper
    /// is active. Failures are never surfaced anywhere else: by the time a
    /// deletion runs, the registering caller is gone.
    pub async fn delete_failures(&self) -> Vec<DeleteFailure> {
        self.inner.failures.lock().await.clone()
    }

    /// Stop accepting registrations and let the reaper exit once the live
    /// set drains to empty.
    ///
    /// Idempotent. Pending entries are still processed; nothing is
    /// force-terminated. If no registration ever happened, no reaper is
    /// created and the tracker is terminally stopped.
    pub async fn exit_when_finished(&self) {
        let mut state = self.inner.state.lock().await;
        if state.exit_when_finished {
            return;
        }
        state.exit_when_finished = true;

        match &state.reaper {
            Some(handle) => {
                info!(
                    pending = state.entries.len(),
                    "shutdown requested; reaper exits once tracked paths drain"
                );
                // Wakes the reaper even when no reclamation is pending.
                let _ = handle.queue.send(ReaperEvent::Shutdown);
            }
            None => {
                debug!("shutdown requested before any registration; no reaper to stop");
            }
        }
    }

    /// Whether the reaper task is currently alive.
    pub async fn is_reaper_running(&self) -> bool {
        let state = self.inner.state.lock().await;
        state
            .reaper
            .as_ref()
            .map(|handle| !handle.task.is_finished())
            .unwrap_or(false)
    }
}

static DEFAULT_TRACKER: Lazy<CleanupTracker> = Lazy::new(CleanupTracker::new);

/// Process-wide tracker, created on first use.
///
/// There is no teardown contract for the default tracker; its reaper lives
/// for the remainder of the process once started.
pub fn default_tracker() -> &'static CleanupTracker {
    &DEFAULT_TRACKER
}
