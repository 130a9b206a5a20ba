//! Sequential file utilities
//!
//! Thin wrappers over `tokio::fs` for the copy/move/read plumbing that
//! surrounds deferred cleanup. These do plain sequential I/O; anything
//! concurrent lives in the tracker.

use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;

/// Copy `src` to `dst`, creating missing parent directories.
///
/// Returns the number of bytes copied. An existing `dst` is overwritten.
pub async fn copy_file(src: &Path, dst: &Path) -> Result<u64> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    fs::copy(src, dst).await.with_context(|| {
        format!(
            "Failed to copy {} to {}",
            src.display(),
            dst.display()
        )
    })
}

/// Move `src` to `dst`.
///
/// Tries a rename first and falls back to copy-then-delete when the rename
/// fails, e.g. across filesystems.
pub async fn move_file(src: &Path, dst: &Path) -> Result<()> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    if fs::rename(src, dst).await.is_ok() {
        return Ok(());
    }

    copy_file(src, dst).await?;
    fs::remove_file(src)
        .await
        .with_context(|| format!("Failed to remove {} after copy", src.display()))
}

/// Read a file's entire contents as UTF-8.
pub async fn read_file_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

/// Total size in bytes of everything under `dir`.
///
/// Entries that cannot be read or stat'd are skipped rather than failing the
/// whole walk. A missing directory counts as zero.
pub async fn dir_size(dir: &Path) -> Result<u64> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut total = 0u64;
    let mut stack = vec![dir.to_path_buf()];

    while let Some(current) = stack.pop() {
        let mut entries = match fs::read_dir(&current).await {
            Ok(entries) => entries,
            Err(_) => continue,
        };

        loop {
            match entries.next_entry().await {
                Ok(Some(entry)) => {
                    let path = entry.path();
                    let metadata = match fs::symlink_metadata(&path).await {
                        Ok(m) => m,
                        Err(_) => continue,
                    };

                    if metadata.is_dir() {
                        stack.push(path);
                    } else {
                        total += metadata.len();
                    }
                }
                Ok(None) => break,
                Err(_) => break,
            }
        }
    }

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_copy_file_creates_parents() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("src.txt");
        let dst = temp_dir.path().join("a/b/dst.txt");
        fs::write(&src, "payload").await.unwrap();

        let copied = copy_file(&src, &dst).await.unwrap();
        assert_eq!(copied, 7);
        assert_eq!(fs::read_to_string(&dst).await.unwrap(), "payload");
        assert!(src.exists());
    }

    #[tokio::test]
    async fn test_move_file_removes_source() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("src.txt");
        let dst = temp_dir.path().join("moved/dst.txt");
        fs::write(&src, "payload").await.unwrap();

        move_file(&src, &dst).await.unwrap();
        assert!(!src.exists());
        assert_eq!(fs::read_to_string(&dst).await.unwrap(), "payload");
    }

    #[tokio::test]
    async fn test_read_file_to_string_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope.txt");
        assert!(read_file_to_string(&missing).await.is_err());
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn test_dir_size_skips_unreadable_entries() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        fs::write(dir.join("counted.txt"), "12345678").await.unwrap();

        let sealed = dir.join("sealed");
        fs::create_dir(&sealed).await.unwrap();
        std::fs::set_permissions(&sealed, std::fs::Permissions::from_mode(0o000)).unwrap();

        // The unreadable directory is skipped, not an error.
        let size = dir_size(dir).await;

        std::fs::set_permissions(&sealed, std::fs::Permissions::from_mode(0o755)).unwrap();
        assert_eq!(size.unwrap(), 8);
    }

    #[tokio::test]
    async fn test_dir_size_sums_nested_files() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        fs::create_dir(dir.join("sub")).await.unwrap();
        fs::write(dir.join("one.txt"), "hello").await.unwrap();
        fs::write(dir.join("sub/two.txt"), "world").await.unwrap();

        assert_eq!(dir_size(dir).await.unwrap(), 10);
        assert_eq!(dir_size(&dir.join("missing")).await.unwrap(), 0);
    }
}
