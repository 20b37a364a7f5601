//! Single-file and recursive tree copy
//!
//! [`copy`] refuses to overwrite: the destination must not exist at all.
//! Directory trees are rebuilt top-down during the walk (destination
//! directories on pre-order visits, file contents streamed on leaf
//! visits) and failures accumulate without aborting. If anything failed,
//! whatever was built at the destination is torn down again before the
//! failure is reported, so a failed copy leaves no residue. The rollback is
//! best-effort, not transactional: a crash mid-copy can still leave some.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::delete::delete;
use crate::error::{EntryFailure, FsError, Result};
use crate::file::{FileHandle, OpenMode};
use crate::pathops;
use crate::reader::BUFFER_SIZE;
use crate::stat;
use crate::walker::{TreeEntry, TreeWalker};

/// Permission bits for directories created while copying; the process
/// umask applies as usual
const COPY_DIRECTORY_MODE: u32 = 0o777;

/// Copy a file or directory tree to a destination that must not exist
///
/// The source is classified with `lstat`. A file is streamed with
/// [`copy_file`]; a directory is walked no-follow, with each entry's
/// destination path computed by substituting the destination root for the
/// source-root prefix. Symlinks are copied by content: the bytes of
/// whatever they resolve to, like the leaf files they are reported as.
///
/// # Errors
///
/// Returns [`FsError::DestinationExists`], touching nothing, if the
/// destination is already present, [`FsError::Io`] if the source cannot be
/// classified, or the accumulated failure ([`FsError::Partial`] for a
/// directory source) after the partial destination has been removed again.
pub fn copy<P: AsRef<Path>, Q: AsRef<Path>>(source: P, destination: Q) -> Result<()> {
    let source = source.as_ref();
    let destination = destination.as_ref();

    let st = stat::lstat(source)?;

    if stat::lstat(destination).is_ok() {
        return Err(FsError::DestinationExists {
            path: destination.to_path_buf(),
        });
    }

    let result = if st.is_dir() {
        copy_directory(source, destination)
    } else {
        copy_file(source, destination)
    };

    if let Err(err) = result {
        // Roll back whatever was built before the failure.
        if stat::lstat(destination).is_ok() {
            if let Err(cleanup) = delete(destination) {
                warn!(
                    "failed to remove partial copy at {}: {cleanup}",
                    destination.display()
                );
            }
        }

        return Err(err);
    }

    Ok(())
}

/// Stream one file's bytes to a newly created destination file
///
/// The source is opened read-only (a symlink source is followed), the
/// destination created write-truncate, and content moved in fixed-size
/// chunks until end-of-file.
///
/// # Errors
///
/// Returns [`FsError::Io`] if either side cannot be opened or a transfer
/// fails, or [`FsError::ShortWrite`] if the destination accepted fewer
/// bytes than one chunk read produced.
pub fn copy_file<P: AsRef<Path>, Q: AsRef<Path>>(source: P, destination: Q) -> Result<()> {
    let destination = destination.as_ref();

    let mut from = FileHandle::open(source, OpenMode::READING)?;
    let mut to = FileHandle::open(destination, OpenMode::WRITING)?;
    let mut chunk = [0u8; BUFFER_SIZE];

    loop {
        let bytes = from.read_buffer(&mut chunk)?;

        if bytes == 0 {
            return Ok(());
        }

        let written = to.write_buffer(&chunk[..bytes])?;

        if written != bytes {
            return Err(FsError::ShortWrite {
                path: destination.to_path_buf(),
                written,
                expected: bytes,
            });
        }
    }
}

/// Walk the source tree and rebuild it under the destination root
fn copy_directory(source: &Path, destination: &Path) -> Result<()> {
    let mut failures = Vec::new();

    for entry in TreeWalker::new(source) {
        match entry {
            TreeEntry::DirectoryPre(path) => {
                let target = rebase(&path, source, destination);
                debug!("creating directory {}", target.display());

                if let Err(error) = pathops::create_directory(&target, COPY_DIRECTORY_MODE) {
                    failures.push(EntryFailure { path, error });
                }
            }
            TreeEntry::File(path) => {
                let target = rebase(&path, source, destination);
                debug!("copying {} to {}", path.display(), target.display());

                if let Err(error) = copy_file(&path, &target) {
                    failures.push(EntryFailure { path, error });
                }
            }
            TreeEntry::DirectoryPost(_) => {}
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
            op: "copy",
            root: source.to_path_buf(),
            failures,
        })
    }
}

/// Substitute the destination root for the source-root prefix
fn rebase(path: &Path, source: &Path, destination: &Path) -> PathBuf {
    match path.strip_prefix(source) {
        Ok(relative) => destination.join(relative),
        Err(_) => destination.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_copy_file_preserves_content() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let source = temp_dir.path().join("source.bin");
        let destination = temp_dir.path().join("copy.bin");
        let data: Vec<u8> = (0..=255u8).cycle().take(2 * BUFFER_SIZE + 17).collect();
        fs::write(&source, &data)?;

        copy(&source, &destination)?;

        assert_eq!(fs::read(&destination)?, data);
        assert_eq!(fs::read(&source)?, data);

        Ok(())
    }

    #[test]
    fn test_copy_refuses_existing_destination() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let source = temp_dir.path().join("source.txt");
        let destination = temp_dir.path().join("present.txt");
        fs::write(&source, b"new content")?;
        fs::write(&destination, b"old content")?;

        let result = copy(&source, &destination);

        assert!(matches!(result, Err(FsError::DestinationExists { .. })));
        assert_eq!(fs::read(&destination)?, b"old content");

        Ok(())
    }

    #[test]
    fn test_rebase_substitutes_root_prefix() {
        let target = rebase(
            Path::new("/src/a/b.txt"),
            Path::new("/src"),
            Path::new("/dst"),
        );

        assert_eq!(target, Path::new("/dst/a/b.txt"));
    }
}
