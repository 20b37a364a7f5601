//! Path metadata queries
//!
//! [`stat`] and [`lstat`] produce a fresh, owned [`FileStat`] snapshot per
//! call; nothing is cached or shared. [`statfs`] reports filesystem
//! capacity for the volume a path lives on.

use std::ffi::CString;
use std::fs;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use std::time::SystemTime;

use crate::error::{FsError, Result};

/// Snapshot of one path's metadata
///
/// Field-for-field what the platform `stat` structure reports, with
/// timestamps converted to [`SystemTime`]. `created` falls back to the
/// inode change time on filesystems without a birth time, so it is always
/// populated.
#[derive(Debug, Clone)]
pub struct FileStat {
    /// Device the path lives on
    pub dev: u64,
    /// Inode number
    pub ino: u64,
    /// File mode (type + permission bits)
    pub mode: u32,
    /// Number of hard links
    pub nlink: u64,
    /// User ID of owner
    pub uid: u32,
    /// Group ID of owner
    pub gid: u32,
    /// Device ID for character and block special files
    pub rdev: u64,
    /// Last access time
    pub accessed: SystemTime,
    /// Last modification time
    pub modified: SystemTime,
    /// Last inode change time
    pub changed: SystemTime,
    /// Creation time, or the change time where the platform has no birth time
    pub created: SystemTime,
    /// Size in bytes
    pub size: u64,
    /// Number of 512-byte blocks allocated
    pub blocks: u64,
    /// Preferred I/O block size
    pub blksize: u64,
}

impl FileStat {
    /// Build a snapshot from already-fetched metadata
    fn from_metadata(metadata: &fs::Metadata) -> Self {
        use std::os::unix::fs::MetadataExt;

        let changed = unix_timestamp_to_system_time(metadata.ctime(), metadata.ctime_nsec());

        Self {
            dev: metadata.dev(),
            ino: metadata.ino(),
            mode: metadata.mode(),
            nlink: metadata.nlink(),
            uid: metadata.uid(),
            gid: metadata.gid(),
            rdev: metadata.rdev(),
            accessed: unix_timestamp_to_system_time(metadata.atime(), metadata.atime_nsec()),
            modified: unix_timestamp_to_system_time(metadata.mtime(), metadata.mtime_nsec()),
            changed,
            created: metadata.created().unwrap_or(changed),
            size: metadata.len(),
            blocks: metadata.blocks(),
            blksize: metadata.blksize(),
        }
    }

    /// Check if this is a regular file
    #[must_use]
    pub fn is_file(&self) -> bool {
        (self.mode & libc::S_IFMT as u32) == libc::S_IFREG as u32
    }

    /// Check if this is a directory
    #[must_use]
    pub fn is_dir(&self) -> bool {
        (self.mode & libc::S_IFMT as u32) == libc::S_IFDIR as u32
    }

    /// Check if this is a symlink
    #[must_use]
    pub fn is_symlink(&self) -> bool {
        (self.mode & libc::S_IFMT as u32) == libc::S_IFLNK as u32
    }

    /// Get file permissions (mode & 0o7777)
    #[must_use]
    pub fn permissions(&self) -> u32 {
        self.mode & 0o7777
    }
}

/// Convert Unix timestamp (seconds + nanoseconds) to `SystemTime` with pre-epoch support
///
/// Handles timestamps before 1970 (negative secs) correctly.
fn unix_timestamp_to_system_time(secs: i64, nsec: i64) -> SystemTime {
    let nsec = nsec as u32;

    if secs >= 0 {
        SystemTime::UNIX_EPOCH + std::time::Duration::new(secs as u64, nsec)
    } else {
        let abs_secs = (-secs) as u64;
        // Saturate: if subtraction underflows, clamp to UNIX_EPOCH
        SystemTime::UNIX_EPOCH
            .checked_sub(std::time::Duration::new(abs_secs, nsec))
            .unwrap_or(SystemTime::UNIX_EPOCH)
    }
}

/// Stat a path, following a terminal symbolic link
///
/// # Errors
///
/// Returns [`FsError::Io`] carrying the OS error code if the path cannot be
/// statted.
pub fn stat<P: AsRef<Path>>(path: P) -> Result<FileStat> {
    let path = path.as_ref();
    let metadata = fs::metadata(path).map_err(|err| FsError::io("stat", path, err))?;

    Ok(FileStat::from_metadata(&metadata))
}

/// Stat a path without following a terminal symbolic link
///
/// # Errors
///
/// Returns [`FsError::Io`] carrying the OS error code if the path cannot be
/// statted.
pub fn lstat<P: AsRef<Path>>(path: P) -> Result<FileStat> {
    let path = path.as_ref();
    let metadata = fs::symlink_metadata(path).map_err(|err| FsError::io("lstat", path, err))?;

    Ok(FileStat::from_metadata(&metadata))
}

/// Whether a path exists, as reported by [`stat`]
///
/// Any stat failure (absence, permission denial on a parent, a dangling
/// symlink) reads uniformly as "does not exist"; callers cannot tell the
/// causes apart through this call.
#[must_use]
pub fn exists<P: AsRef<Path>>(path: P) -> bool {
    stat(path).is_ok()
}

/// Whether a path exists and is a directory, as reported by [`stat`]
///
/// Shares the uniform-failure contract of [`exists`].
#[must_use]
pub fn directory_exists<P: AsRef<Path>>(path: P) -> bool {
    stat(path).map(|st| st.is_dir()).unwrap_or(false)
}

/// Capacity of the filesystem a path lives on
#[derive(Debug, Clone)]
pub struct FilesystemStat {
    /// Preferred I/O block size
    pub block_size: u64,
    /// Fundamental block size the counts below are in
    pub fragment_size: u64,
    /// Total blocks
    pub blocks: u64,
    /// Free blocks
    pub blocks_free: u64,
    /// Free blocks available to unprivileged users
    pub blocks_available: u64,
    /// Total inodes
    pub files: u64,
    /// Free inodes
    pub files_free: u64,
    /// Free inodes available to unprivileged users
    pub files_available: u64,
    /// Filesystem ID
    pub filesystem_id: u64,
    /// Mount flags
    pub flags: u64,
    /// Maximum filename length
    pub name_max: u64,
}

/// Query filesystem capacity for the volume holding `path`
///
/// # Errors
///
/// Returns [`FsError::Io`] carrying the OS error code if the query fails or
/// the path contains an interior NUL byte.
#[allow(clippy::cast_lossless)]
pub fn statfs<P: AsRef<Path>>(path: P) -> Result<FilesystemStat> {
    let path = path.as_ref();
    let cpath = CString::new(path.as_os_str().as_bytes())
        .map_err(|_| FsError::io("statvfs", path, io::Error::from(io::ErrorKind::InvalidInput)))?;

    let mut buffer: libc::statvfs = unsafe { std::mem::zeroed() };

    // SAFETY: cpath is a valid NUL-terminated string and buffer is a zeroed
    // statvfs struct the kernel fills in on success.
    let rc = unsafe { libc::statvfs(cpath.as_ptr(), &mut buffer) };

    if rc < 0 {
        return Err(FsError::io("statvfs", path, io::Error::last_os_error()));
    }

    Ok(FilesystemStat {
        block_size: buffer.f_bsize as u64,
        fragment_size: buffer.f_frsize as u64,
        blocks: buffer.f_blocks as u64,
        blocks_free: buffer.f_bfree as u64,
        blocks_available: buffer.f_bavail as u64,
        files: buffer.f_files as u64,
        files_free: buffer.f_ffree as u64,
        files_available: buffer.f_favail as u64,
        filesystem_id: buffer.f_fsid as u64,
        flags: buffer.f_flag as u64,
        name_max: buffer.f_namemax as u64,
    })
}
