//! Error types shared across the crate
//!
//! Every failing operation reports which OS-level operation failed and on
//! which path, so the underlying OS error code stays reachable through
//! [`FsError::os_error`]. Tree operations that keep going after individual
//! failures aggregate them into [`FsError::Partial`] instead of keeping only
//! the most recent one.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, FsError>;

/// One failed step inside a multi-step tree operation
#[derive(Debug)]
pub struct EntryFailure {
    /// Path the failing step operated on
    pub path: PathBuf,
    /// What went wrong at that path
    pub error: FsError,
}

/// Errors produced by filesystem operations
#[derive(Debug, Error)]
pub enum FsError {
    /// A single OS-level operation failed
    #[error("{op} failed for {}: {source}", .path.display())]
    Io {
        /// Operation that failed ("open", "unlink", "mkdir", ...)
        op: &'static str,
        /// Path the operation was applied to
        path: PathBuf,
        /// Underlying OS error
        #[source]
        source: io::Error,
    },

    /// Refused to overwrite an existing copy destination
    #[error("destination {} already exists", .path.display())]
    DestinationExists {
        /// The path that was already present
        path: PathBuf,
    },

    /// The stream ended before an exact-length read was satisfied
    #[error("stream ended after {got} of {wanted} bytes")]
    TruncatedRead {
        /// Bytes the caller asked for
        wanted: usize,
        /// Bytes available before end-of-stream
        got: usize,
    },

    /// The descriptor accepted fewer bytes than were handed to it
    #[error("short write to {}: {written} of {expected} bytes", .path.display())]
    ShortWrite {
        /// Destination path
        path: PathBuf,
        /// Bytes the descriptor took
        written: usize,
        /// Bytes that were offered
        expected: usize,
    },

    /// A line-oriented read produced bytes that are not valid UTF-8
    #[error("line is not valid UTF-8")]
    NonUtf8(#[from] std::string::FromUtf8Error),

    /// A tree operation ran to completion but some of its steps failed
    #[error("{op} finished with {} failure(s) under {}", .failures.len(), .root.display())]
    Partial {
        /// Operation that was attempted ("copy", "delete")
        op: &'static str,
        /// Root the operation started from
        root: PathBuf,
        /// Every failed step, in the order it was encountered
        failures: Vec<EntryFailure>,
    },
}

impl FsError {
    /// Wrap an `io::Error` with the operation and path it belongs to
    pub(crate) fn io(op: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            op,
            path: path.into(),
            source,
        }
    }

    /// The OS error code behind this error, when there is one
    ///
    /// For [`FsError::Partial`] this is the code of the last failure
    /// encountered during the walk, matching the single-slot errno behavior
    /// callers of the legacy interface relied on.
    #[must_use]
    pub fn os_error(&self) -> Option<i32> {
        match self {
            Self::Io { source, .. } => source.raw_os_error(),
            Self::Partial { failures, .. } => failures.last().and_then(|f| f.error.os_error()),
            _ => None,
        }
    }
}
