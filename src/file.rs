//! Descriptor-owning file handles with a mirrored logical offset
//!
//! A [`FileHandle`] owns exactly one OS descriptor and tracks the logical
//! offset from which the next read or write occurs. The offset is updated on
//! every successful read, write, and seek, so callers can reposition the
//! descriptor precisely (the separator-delimited reads in
//! [`crate::reader`] depend on this).

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::ops::BitOr;
use std::os::unix::io::{AsRawFd, RawFd};
use std::path::{Path, PathBuf};

use crate::error::{FsError, Result};

/// Composable open-mode flags
///
/// Flags combine with `|`. `WRITING` creates the file if absent and
/// truncates it unless `UPDATING` is also present; `UPDATING` sends writes
/// to the current end of file; `READING` on its own requires the file to
/// exist already.
///
/// # Examples
///
/// ```rust,ignore
/// use localfs::{FileHandle, OpenMode};
///
/// let handle = FileHandle::open("data.log", OpenMode::READING | OpenMode::WRITING)?;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenMode(u8);

impl OpenMode {
    /// Read access; on its own, the file must already exist
    pub const READING: Self = Self(1 << 0);
    /// Write access; creates the file and truncates unless combined with `UPDATING`
    pub const WRITING: Self = Self(1 << 1);
    /// Writes go to the current end of file instead of truncating
    pub const UPDATING: Self = Self(1 << 2);

    /// Whether every flag in `other` is also set in `self`
    #[must_use]
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for OpenMode {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// An open file plus the logical offset of its descriptor
///
/// The handle exclusively owns the descriptor. Dropping it closes the
/// descriptor; [`FileHandle::close`] does the same eagerly and is a no-op
/// when called again. Using a handle after closing it is a caller bug and
/// panics rather than returning an error.
///
/// Two handles opened on the same path maintain independent offsets and are
/// never synchronized by this type; coordinating access to one path across
/// handles or threads is the caller's responsibility.
pub struct FileHandle {
    /// `None` once the handle has been closed
    file: Option<File>,
    /// Path the handle was opened from, kept for error context
    path: PathBuf,
    /// Position the next read or write is defined to occur at
    offset: u64,
}

impl FileHandle {
    /// Open `path` with the given mode flags
    ///
    /// # Errors
    ///
    /// Returns [`FsError::Io`] carrying the OS error code if the file cannot
    /// be opened, for example `READING` on a path that does not exist, or
    /// permission denial.
    pub fn open<P: AsRef<Path>>(path: P, mode: OpenMode) -> Result<Self> {
        let path = path.as_ref();
        let writing = mode.contains(OpenMode::WRITING);
        let updating = mode.contains(OpenMode::UPDATING);

        let file = OpenOptions::new()
            .read(mode.contains(OpenMode::READING))
            .write(writing || updating)
            .create(writing)
            .append(updating)
            .truncate(writing && !updating)
            .open(path)
            .map_err(|err| FsError::io("open", path, err))?;

        Ok(Self {
            file: Some(file),
            path: path.to_path_buf(),
            offset: 0,
        })
    }

    /// Open an existing file for reading only
    ///
    /// # Errors
    ///
    /// Returns [`FsError::Io`] if the file does not exist or cannot be read.
    pub fn for_reading<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open(path, OpenMode::READING)
    }

    /// Open a file for writing, creating it and discarding prior content
    ///
    /// # Errors
    ///
    /// Returns [`FsError::Io`] if the file cannot be created or opened.
    pub fn for_writing<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open(path, OpenMode::WRITING)
    }

    /// Open a file for reading and appending, creating it if absent
    ///
    /// Existing content is preserved; writes land at the end of the file.
    ///
    /// # Errors
    ///
    /// Returns [`FsError::Io`] if the file cannot be created or opened.
    pub fn for_updating<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open(path, OpenMode::READING | OpenMode::WRITING | OpenMode::UPDATING)
    }

    /// Open an anonymous temporary file for reading and writing
    ///
    /// The file has no name on disk and disappears when the handle is
    /// closed or dropped.
    ///
    /// # Errors
    ///
    /// Returns [`FsError::Io`] if the temporary file cannot be created.
    pub fn temporary() -> Result<Self> {
        let file =
            tempfile::tempfile().map_err(|err| FsError::io("tmpfile", "(temporary)", err))?;

        Ok(Self {
            file: Some(file),
            path: PathBuf::from("(temporary)"),
            offset: 0,
        })
    }

    /// The open descriptor behind this handle
    ///
    /// # Panics
    ///
    /// Panics if the handle has been closed; every operation on a closed
    /// handle is a caller bug, not a recoverable failure.
    #[allow(clippy::panic)]
    fn descriptor(&self) -> &File {
        match &self.file {
            Some(file) => file,
            None => panic!("file handle for {} used after close", self.path.display()),
        }
    }

    #[allow(clippy::panic)]
    fn descriptor_mut(&mut self) -> &mut File {
        match &mut self.file {
            Some(file) => file,
            None => panic!("file handle for {} used after close", self.path.display()),
        }
    }

    /// Read up to `buffer.len()` bytes at the current offset
    ///
    /// Advances the offset by the number of bytes actually read. A return of
    /// zero with a non-empty buffer means end-of-stream.
    ///
    /// # Errors
    ///
    /// Returns [`FsError::Io`] carrying the OS error code on read failure;
    /// the offset is left unchanged in that case.
    pub fn read_buffer(&mut self, buffer: &mut [u8]) -> Result<usize> {
        let result = self.descriptor_mut().read(buffer);
        let bytes = result.map_err(|err| FsError::io("read", &self.path, err))?;

        self.offset += bytes as u64;

        Ok(bytes)
    }

    /// Write `buffer` at the current offset
    ///
    /// Advances the offset by the number of bytes actually written. In
    /// `UPDATING` mode the bytes land at end-of-file regardless of the
    /// offset, as `O_APPEND` semantics dictate.
    ///
    /// # Errors
    ///
    /// Returns [`FsError::Io`] carrying the OS error code on write failure;
    /// the offset is left unchanged in that case.
    pub fn write_buffer(&mut self, buffer: &[u8]) -> Result<usize> {
        let result = self.descriptor_mut().write(buffer);
        let bytes = result.map_err(|err| FsError::io("write", &self.path, err))?;

        self.offset += bytes as u64;

        Ok(bytes)
    }

    /// Reposition the descriptor to an absolute offset
    ///
    /// On underlying failure the logical offset is left at its last
    /// known-good value and no error is surfaced.
    pub fn seek(&mut self, offset: u64) {
        if let Ok(position) = self.descriptor_mut().seek(SeekFrom::Start(offset)) {
            self.offset = position;
        }
    }

    /// Reposition the descriptor to end-of-file and return the offset there
    ///
    /// Shares the silent-failure contract of [`FileHandle::seek`]: if the
    /// underlying seek fails, the previous offset is returned unchanged.
    pub fn seek_to_end(&mut self) -> u64 {
        if let Ok(position) = self.descriptor_mut().seek(SeekFrom::End(0)) {
            self.offset = position;
        }

        self.offset
    }

    /// The logical offset the next read or write occurs at
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Cut the file off at `offset` bytes
    ///
    /// The logical offset is not moved; a subsequent write past the new end
    /// extends the file again.
    ///
    /// # Errors
    ///
    /// Returns [`FsError::Io`] carrying the OS error code if truncation fails.
    pub fn truncate(&mut self, offset: u64) -> Result<()> {
        self.descriptor()
            .set_len(offset)
            .map_err(|err| FsError::io("truncate", &self.path, err))
    }

    /// Release the descriptor
    ///
    /// Safe to call more than once; the second and later calls are no-ops.
    /// Dropping the handle performs the same release implicitly.
    pub fn close(&mut self) {
        self.file.take();
    }

    /// Whether the handle still owns an open descriptor
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }
}

impl AsRawFd for FileHandle {
    fn as_raw_fd(&self) -> RawFd {
        self.descriptor().as_raw_fd()
    }
}

impl std::fmt::Debug for FileHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileHandle")
            .field("path", &self.path)
            .field("offset", &self.offset)
            .field("open", &self.file.is_some())
            .finish()
    }
}
