//! # localfs
//!
//! Local filesystem toolkit with support for:
//! - Buffered, offset-tracked sequential file I/O with separator-delimited
//!   reads that resume at exact byte positions
//! - `stat`/`lstat`/`exists` queries and filesystem-capacity reporting
//! - Depth-first tree traversal with pre/post directory bracketing
//! - Recursive delete and copy built on the traversal, with failure
//!   aggregation and best-effort rollback
//! - Path-level operations: rename, symlink, mkdir with raw mode bits,
//!   chmod, truncate-by-path, directory enumeration
//!
//! Everything is synchronous: each operation blocks the calling thread on
//! the underlying OS call. There is no internal scheduling and no
//! cancellation: a traversal or bulk read runs to completion or failure.
//! Every value handed back (stat records, buffers, traversal entries) is an
//! independently owned value.
//!
//! ## Example
//!
//! ```rust,no_run
//! use localfs::{copy, delete, BufferedReader, FileHandle};
//!
//! # fn example() -> localfs::Result<()> {
//! copy("/data/config", "/data/config.bak")?;
//!
//! let mut handle = FileHandle::for_reading("/data/config/settings.conf")?;
//! let mut reader = BufferedReader::new(&mut handle);
//!
//! while let Some(line) = reader.read_config_line()? {
//!     println!("directive: {line}");
//! }
//!
//! delete("/data/config.bak")?;
//! # Ok(())
//! # }
//! ```
//!
//! Failures carry the OS error code of the syscall that failed; tree
//! operations that outlive individual failures report all of them through
//! [`FsError::Partial`].

pub mod copy;
pub mod delete;
pub mod error;
pub mod file;
pub mod pathops;
pub mod reader;
pub mod stat;
pub mod walker;

// Re-export main types
pub use copy::{copy, copy_file};
pub use delete::delete;
pub use error::{EntryFailure, FsError, Result};
pub use file::{FileHandle, OpenMode};
pub use pathops::{clear, create_directory, directory_contents, rename, set_mode, symlink};
pub use reader::{BufferedReader, BUFFER_SIZE};
pub use stat::{directory_exists, exists, lstat, stat, statfs, FileStat, FilesystemStat};
pub use walker::{TreeEntry, TreeWalker};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
