//! # sweepfs
//!
//! Deferred filesystem cleanup: tie the deletion of a path to the lifetime
//! of a [`Marker`] handle instead of explicit delete calls at every call
//! site. Register a path with a [`CleanupTracker`], hold the returned marker
//! wherever the resource is used, and a background reaper removes the path
//! once the last clone of the marker is dropped.
//!
//! ```no_run
//! use sweepfs::{CleanupTracker, DeleteStrategy};
//!
//! # async fn demo() -> sweepfs::Result<()> {
//! let tracker = CleanupTracker::new();
//! let marker = tracker.track("/tmp/scratch", DeleteStrategy::Force).await?;
//!
//! // ... hand `marker` (or clones of it) to whatever uses /tmp/scratch ...
//!
//! drop(marker); // last drop queues the deletion; the reaper removes the path
//! # Ok(())
//! # }
//! ```
//!
//! Deletion failures are never raised on a caller thread — by the time the
//! reaper runs, the registering caller is gone. Poll
//! [`CleanupTracker::delete_failures`] to observe them.
//!
//! ## Modules
//!
//! - `tracker` - the cleanup tracker, its markers, and the background reaper
//! - `strategy` - normal / force / noop delete strategies
//! - `fsutil` - sequential copy/move/read helpers
//! - `filename` - stateless file-name legality and truncation helpers
//! - `walker` - recursive directory walking with cancellation
//! - `endian` - byte-order conversion helpers
//! - `error` - crate error taxonomy

pub mod endian;
pub mod error;
pub mod filename;
pub mod fsutil;
pub mod strategy;
pub mod tracker;
pub mod walker;

pub use error::{Error, Result};
pub use strategy::DeleteStrategy;
pub use tracker::{default_tracker, CleanupTracker, DeleteFailure, Marker, TrackedEntry};
pub use walker::{CancelToken, DirVisitor};
