//! Recursive directory walking with cooperative cancellation
//!
//! A [`DirVisitor`] receives every directory and file under a root in
//! depth-first order. Directories can be pruned, and a shared [`CancelToken`]
//! aborts the walk between entries. The walk is synchronous and holds no
//! background state.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Shared flag that aborts an in-progress walk.
///
/// Clones observe the same flag, so one side can cancel a walk running on
/// another thread.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. The walk stops before the next entry.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Callbacks invoked as the walker descends a directory tree.
pub trait DirVisitor {
    /// Called for each directory, including the root. Return `false` to skip
    /// the directory's contents.
    fn enter_dir(&mut self, path: &Path, depth: usize) -> Result<bool> {
        let _ = (path, depth);
        Ok(true)
    }

    /// Called for each non-directory entry (files and symlinks).
    fn visit_file(&mut self, path: &Path) -> Result<()>;
}

/// Walk the tree under `root`, feeding every entry to `visitor`.
///
/// Fails with [`Error::Cancelled`] as soon as `cancel` trips; any error the
/// visitor returns also aborts the walk. Symlinks are reported as files and
/// never followed.
pub fn walk<V: DirVisitor>(root: &Path, visitor: &mut V, cancel: &CancelToken) -> Result<()> {
    let mut entries = WalkDir::new(root).into_iter();

    while let Some(entry) = entries.next() {
        if cancel.is_cancelled() {
            debug!(root = %root.display(), "walk cancelled");
            return Err(Error::Cancelled(root.to_path_buf()));
        }

        let entry = entry.map_err(|e| Error::Io(e.into()))?;
        if entry.file_type().is_dir() {
            if !visitor.enter_dir(entry.path(), entry.depth())? {
                entries.skip_current_dir();
            }
        } else {
            visitor.visit_file(entry.path())?;
        }
    }

    Ok(())
}
