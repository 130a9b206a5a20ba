//! Delete strategies for tracked paths
//!
//! A strategy decides how far a deletion is willing to go: `Normal` refuses
//! to touch a directory that still has contents, `Force` empties it first,
//! and `Noop` keeps the tracking bookkeeping without removing anything.

use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// How a tracked path is removed once its marker is reclaimed.
///
/// Strategies are stateless and copyable; the same value can be shared
/// across any number of registrations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeleteStrategy {
    /// Remove a plain file or an empty directory; fail on anything else.
    #[default]
    Normal,
    /// Recursively empty a directory before removing it. Failures on
    /// individual descendants are collected, not fail-fast.
    Force,
    /// Perform no deletion at all.
    Noop,
}

impl DeleteStrategy {
    /// Delete `path` according to this strategy.
    ///
    /// An empty path fails with [`Error::InvalidArgument`]. A path that does
    /// not exist is a success for every strategy, so deletions are
    /// idempotent. Symlinks are removed, never followed.
    pub async fn delete(&self, path: &Path) -> Result<()> {
        if path.as_os_str().is_empty() {
            return Err(Error::InvalidArgument(
                "cannot delete an empty path".to_string(),
            ));
        }

        let metadata = match fs::symlink_metadata(path).await {
            Ok(m) => m,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "path already absent, nothing to delete");
                return Ok(());
            }
            Err(e) => {
                return Err(Error::DeleteFailed {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        };

        match self {
            DeleteStrategy::Noop => {
                debug!(path = %path.display(), "noop strategy, leaving path in place");
                Ok(())
            }
            DeleteStrategy::Normal => {
                let result = if metadata.is_dir() {
                    fs::remove_dir(path).await
                } else {
                    fs::remove_file(path).await
                };
                result.map_err(|e| Error::DeleteFailed {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
            DeleteStrategy::Force => {
                if metadata.is_dir() {
                    force_remove_dir(path).await
                } else {
                    fs::remove_file(path).await.map_err(|e| Error::DeleteFailed {
                        path: path.to_path_buf(),
                        source: e,
                    })
                }
            }
        }
    }

    /// Delete `path`, swallowing all failures.
    ///
    /// Returns whether the path is absent after the attempt. The empty path
    /// returns `true` vacuously.
    pub async fn delete_quietly(&self, path: &Path) -> bool {
        if path.as_os_str().is_empty() {
            return true;
        }

        if let Err(e) = self.delete(path).await {
            debug!(path = %path.display(), error = %e, "quiet delete failed");
        }

        match fs::symlink_metadata(path).await {
            Err(e) if e.kind() == io::ErrorKind::NotFound => true,
            _ => false,
        }
    }
}

/// Recursively remove a directory, deepest entries first.
///
/// Every descendant is attempted even after failures; anything left behind
/// is reported in one aggregate [`Error::PartialDelete`].
async fn force_remove_dir(root: &Path) -> Result<()> {
    let mut failures: Vec<(PathBuf, String)> = Vec::new();

    // Phase one: discover the tree breadth-first. Reversing the discovery
    // order afterwards guarantees children are removed before their parent.
    let mut dirs = vec![root.to_path_buf()];
    let mut discovered: Vec<(PathBuf, bool)> = Vec::new();
    let mut next = 0;

    while next < dirs.len() {
        let dir = dirs[next].clone();
        next += 1;

        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) => {
                failures.push((dir, e.to_string()));
                continue;
            }
        };

        loop {
            match entries.next_entry().await {
                Ok(Some(entry)) => {
                    let path = entry.path();
                    let is_dir = entry
                        .file_type()
                        .await
                        .map(|t| t.is_dir() && !t.is_symlink())
                        .unwrap_or(false);
                    if is_dir {
                        dirs.push(path.clone());
                    }
                    discovered.push((path, is_dir));
                }
                Ok(None) => break,
                Err(e) => {
                    failures.push((dir.clone(), e.to_string()));
                    break;
                }
            }
        }
    }

    // Phase two: remove in reverse discovery order, then the root itself.
    for (path, is_dir) in discovered.iter().rev() {
        let result = if *is_dir {
            fs::remove_dir(path).await
        } else {
            fs::remove_file(path).await
        };
        if let Err(e) = result {
            if e.kind() != io::ErrorKind::NotFound {
                warn!(path = %path.display(), error = %e, "failed to remove descendant");
                failures.push((path.clone(), e.to_string()));
            }
        }
    }

    if let Err(e) = fs::remove_dir(root).await {
        if e.kind() != io::ErrorKind::NotFound {
            failures.push((root.to_path_buf(), e.to_string()));
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(Error::PartialDelete {
            path: root.to_path_buf(),
            failures,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_normal_deletes_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("victim.txt");
        fs::write(&file, "bytes").await.unwrap();

        DeleteStrategy::Normal.delete(&file).await.unwrap();
        assert!(!file.exists());
    }

    #[tokio::test]
    async fn test_normal_deletes_empty_dir() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("empty");
        fs::create_dir(&dir).await.unwrap();

        DeleteStrategy::Normal.delete(&dir).await.unwrap();
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn test_normal_refuses_non_empty_dir() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("full");
        fs::create_dir(&dir).await.unwrap();
        fs::write(dir.join("inner.txt"), "x").await.unwrap();

        let err = DeleteStrategy::Normal.delete(&dir).await.unwrap_err();
        assert!(matches!(err, Error::DeleteFailed { .. }));

        // The directory and its contents survive a refused delete.
        assert!(dir.exists());
        assert!(dir.join("inner.txt").exists());
    }

    #[tokio::test]
    async fn test_force_removes_nested_tree() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("tree");
        fs::create_dir_all(root.join("a/b/c")).await.unwrap();
        fs::write(root.join("top.txt"), "1").await.unwrap();
        fs::write(root.join("a/mid.txt"), "2").await.unwrap();
        fs::write(root.join("a/b/c/deep.txt"), "3").await.unwrap();

        DeleteStrategy::Force.delete(&root).await.unwrap();
        assert!(!root.exists());
    }

    #[tokio::test]
    #[cfg(target_os = "linux")]
    async fn test_force_partial_failure_collects_and_continues() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("tree");
        fs::create_dir(&root).await.unwrap();
        let stuck = root.join("stuck.txt");
        let sibling = root.join("sibling.txt");
        fs::write(&stuck, "pinned").await.unwrap();
        fs::write(&sibling, "loose").await.unwrap();

        // Pin one file with the immutable attribute; removal fails even for
        // root. Bail out when the filesystem or environment lacks chattr.
        let pinned = std::process::Command::new("chattr")
            .arg("+i")
            .arg(&stuck)
            .status();
        match pinned {
            Ok(status) if status.success() => {}
            _ => return,
        }

        let result = DeleteStrategy::Force.delete(&root).await;

        // Unpin before asserting so the temp dir can clean itself up.
        let _ = std::process::Command::new("chattr")
            .arg("-i")
            .arg(&stuck)
            .status();

        match result.unwrap_err() {
            Error::PartialDelete { path, failures } => {
                assert_eq!(path, root);
                assert!(failures.iter().any(|(p, _)| p == &stuck));
            }
            other => panic!("expected PartialDelete, got {:?}", other),
        }

        // The sweep continued past the failure: the sibling is gone, the
        // pinned file and its directory remain.
        assert!(!sibling.exists());
        assert!(stuck.exists());
        assert!(root.exists());
    }

    #[tokio::test]
    async fn test_absent_path_is_success_for_all_strategies() {
        let temp_dir = TempDir::new().unwrap();
        let ghost = temp_dir.path().join("never-created");

        DeleteStrategy::Normal.delete(&ghost).await.unwrap();
        DeleteStrategy::Force.delete(&ghost).await.unwrap();
        DeleteStrategy::Noop.delete(&ghost).await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_path_is_invalid() {
        let err = DeleteStrategy::Normal.delete(Path::new("")).await.unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_noop_leaves_path_alone() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("keep.txt");
        fs::write(&file, "kept").await.unwrap();

        DeleteStrategy::Noop.delete(&file).await.unwrap();
        assert!(file.exists());
    }

    #[tokio::test]
    async fn test_delete_quietly_reports_absence() {
        let temp_dir = TempDir::new().unwrap();

        // Vacuous success on the empty path.
        assert!(DeleteStrategy::Normal.delete_quietly(Path::new("")).await);
        assert!(DeleteStrategy::Noop.delete_quietly(Path::new("")).await);

        // Non-empty dir under Normal: failure swallowed, path still there.
        let dir = temp_dir.path().join("full");
        fs::create_dir(&dir).await.unwrap();
        fs::write(dir.join("inner.txt"), "x").await.unwrap();
        assert!(!DeleteStrategy::Normal.delete_quietly(&dir).await);
        assert!(dir.exists());

        // Same dir under Force succeeds.
        assert!(DeleteStrategy::Force.delete_quietly(&dir).await);
        assert!(!dir.exists());

        // Already absent counts as absent.
        assert!(DeleteStrategy::Normal.delete_quietly(&dir).await);
    }

    #[tokio::test]
    async fn test_force_removes_symlink_without_following() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("target");
        fs::create_dir(&target).await.unwrap();
        fs::write(target.join("precious.txt"), "keep me").await.unwrap();

        let root = temp_dir.path().join("tree");
        fs::create_dir(&root).await.unwrap();
        #[cfg(unix)]
        tokio::fs::symlink(&target, root.join("link")).await.unwrap();

        DeleteStrategy::Force.delete(&root).await.unwrap();
        assert!(!root.exists());
        // The link target is untouched.
        assert!(target.join("precious.txt").exists());
    }
}
