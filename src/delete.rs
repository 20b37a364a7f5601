//! Recursive removal built on the tree walker
//!
//! Directories are emptied bottom-up: files and symlinks are unlinked as
//! leaves, and each directory is removed at its post-order visit once its
//! children are gone. Individual failures never stop the walk; everything
//! that can be removed is removed, and the failures are reported together
//! at the end.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{EntryFailure, FsError, Result};
use crate::stat;
use crate::walker::{TreeEntry, TreeWalker};

/// Remove a file, symlink, or directory tree
///
/// The root is classified with `lstat`: a non-directory (symlinks as
/// themselves, never their targets) is unlinked directly, a directory is
/// walked no-follow and removed bottom-up.
///
/// # Errors
///
/// Returns [`FsError::Io`] if the root cannot be classified or a
/// non-directory root cannot be unlinked. For a directory root, returns
/// [`FsError::Partial`] listing every step that failed, in encounter
/// order; the walk itself always runs to completion first.
pub fn delete<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    let st = stat::lstat(path)?;

    if st.is_dir() {
        delete_directory(path)
    } else {
        debug!("unlinking {}", path.display());
        fs::remove_file(path).map_err(|err| FsError::io("unlink", path, err))
    }
}

/// Walk a directory tree and remove everything in it, then the tree itself
fn delete_directory(root: &Path) -> Result<()> {
    let mut failures = Vec::new();

    for entry in TreeWalker::new(root) {
        match entry {
            TreeEntry::File(path) => {
                debug!("unlinking {}", path.display());

                if let Err(err) = fs::remove_file(&path) {
                    let error = FsError::io("unlink", &path, err);
                    failures.push(EntryFailure { path, error });
                }
            }
            TreeEntry::DirectoryPre(_) => {}
            TreeEntry::DirectoryPost(path) => {
                debug!("removing directory {}", path.display());

                if let Err(err) = fs::remove_dir(&path) {
                    let error = FsError::io("rmdir", &path, err);
                    failures.push(EntryFailure { path, error });
                }
            }
            TreeEntry::Error(path, err) => {
                let error = FsError::io("walk", &path, err);
                failures.push(EntryFailure { path, error });
            }
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(FsError::Partial {
            op: "delete",
            root: root.to_path_buf(),
            failures,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_delete_regular_file() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("data.txt");
        fs::write(&path, b"x")?;

        delete(&path)?;

        assert!(!stat::exists(&path));

        Ok(())
    }

    #[test]
    fn test_delete_symlink_not_its_target() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let target = temp_dir.path().join("target.txt");
        let link = temp_dir.path().join("link");
        fs::write(&target, b"keep me")?;
        std::os::unix::fs::symlink(&target, &link)?;

        delete(&link)?;

        assert!(stat::lstat(&link).is_err());
        assert_eq!(fs::read(&target)?, b"keep me");

        Ok(())
    }

    #[test]
    fn test_delete_missing_path_fails() {
        let error = delete("/nonexistent/really/not/here").unwrap_err();

        assert_eq!(error.os_error(), Some(libc::ENOENT));
    }

    #[test]
    fn test_delete_empty_directory() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("empty");
        fs::create_dir(&path)?;

        delete(&path)?;

        assert!(!stat::exists(&path));

        Ok(())
    }
}
