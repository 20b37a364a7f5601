//! Path-level operations that need no open handle
//!
//! Thin wrappers over the corresponding OS calls: each one either succeeds
//! or reports an [`FsError::Io`](crate::FsError::Io) naming the operation,
//! the path, and the OS error code.

use std::ffi::OsString;
use std::fs;
use std::path::Path;

use crate::error::{FsError, Result};

/// Rename a file or directory
///
/// # Errors
///
/// Returns [`FsError::Io`](crate::FsError::Io) carrying the OS error code
/// on failure, for example when the destination is on a different device.
pub fn rename<P: AsRef<Path>, Q: AsRef<Path>>(from: P, to: Q) -> Result<()> {
    let from = from.as_ref();

    fs::rename(from, to).map_err(|err| FsError::io("rename", from, err))
}

/// Create a symbolic link at `link` pointing to `target`
///
/// `target` is stored verbatim; it does not need to exist.
///
/// # Errors
///
/// Returns [`FsError::Io`](crate::FsError::Io) carrying the OS error code
/// on failure.
pub fn symlink<P: AsRef<Path>, Q: AsRef<Path>>(target: P, link: Q) -> Result<()> {
    let link = link.as_ref();

    std::os::unix::fs::symlink(target, link).map_err(|err| FsError::io("symlink", link, err))
}

/// Create a directory with the given permission bits
///
/// The bits are passed through verbatim; the process umask applies as
/// usual. Parents are not created.
///
/// # Errors
///
/// Returns [`FsError::Io`](crate::FsError::Io) carrying the OS error code
/// on failure.
pub fn create_directory<P: AsRef<Path>>(path: P, mode: u32) -> Result<()> {
    use std::os::unix::fs::DirBuilderExt;

    let path = path.as_ref();

    fs::DirBuilder::new()
        .mode(mode)
        .create(path)
        .map_err(|err| FsError::io("mkdir", path, err))
}

/// Change a path's permission bits
///
/// # Errors
///
/// Returns [`FsError::Io`](crate::FsError::Io) carrying the OS error code
/// on failure.
pub fn set_mode<P: AsRef<Path>>(path: P, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let path = path.as_ref();

    fs::set_permissions(path, fs::Permissions::from_mode(mode))
        .map_err(|err| FsError::io("chmod", path, err))
}

/// Truncate the file at `path` to zero length
///
/// # Errors
///
/// Returns [`FsError::Io`](crate::FsError::Io) carrying the OS error code
/// if the file does not exist or cannot be truncated.
pub fn clear<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();

    let file = fs::OpenOptions::new()
        .write(true)
        .open(path)
        .map_err(|err| FsError::io("truncate", path, err))?;

    file.set_len(0).map_err(|err| FsError::io("truncate", path, err))
}

/// Names of the entries in a directory
///
/// `.` and `..` are excluded. Ordering is whatever the OS returns.
///
/// # Errors
///
/// Returns [`FsError::Io`](crate::FsError::Io) carrying the OS error code
/// if the directory cannot be opened or read.
pub fn directory_contents<P: AsRef<Path>>(path: P) -> Result<Vec<OsString>> {
    let path = path.as_ref();
    let mut contents = Vec::new();

    for entry in fs::read_dir(path).map_err(|err| FsError::io("opendir", path, err))? {
        let entry = entry.map_err(|err| FsError::io("readdir", path, err))?;
        contents.push(entry.file_name());
    }

    Ok(contents)
}
