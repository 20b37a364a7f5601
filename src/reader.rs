//! Buffered reads layered on [`FileHandle`]
//!
//! [`BufferedReader`] pulls fixed-size chunks from a handle and assembles
//! them into exact-length buffers, whole-stream buffers, or
//! separator-delimited fragments. It keeps no state of its own between
//! calls: after a separator match the handle is repositioned to the byte
//! immediately following the separator, so the next call (through this
//! reader or any other) resumes exactly there.

use crate::error::{FsError, Result};
use crate::file::FileHandle;

/// Chunk size used for all buffered reads
pub const BUFFER_SIZE: usize = 8192;

/// Chunked reading operations on a borrowed [`FileHandle`]
///
/// # Examples
///
/// ```rust,ignore
/// use localfs::{BufferedReader, FileHandle};
///
/// let mut handle = FileHandle::for_reading("settings.conf")?;
/// let mut reader = BufferedReader::new(&mut handle);
///
/// while let Some(line) = reader.read_config_line()? {
///     println!("directive: {line}");
/// }
/// ```
pub struct BufferedReader<'a> {
    file: &'a mut FileHandle,
}

impl<'a> BufferedReader<'a> {
    /// Wrap a handle for buffered reading
    #[must_use]
    pub fn new(file: &'a mut FileHandle) -> Self {
        Self { file }
    }

    /// Read exactly `length` bytes
    ///
    /// Accumulates fixed-size chunks until `length` bytes are available.
    /// Partial results are never returned: if the stream ends early the
    /// bytes read so far are discarded.
    ///
    /// # Errors
    ///
    /// Returns [`FsError::TruncatedRead`] if end-of-stream arrives before
    /// `length` bytes were read, or [`FsError::Io`] on a read failure.
    pub fn read_exact(&mut self, length: usize) -> Result<Vec<u8>> {
        let mut data = Vec::with_capacity(length);
        let mut chunk = [0u8; BUFFER_SIZE];

        while data.len() < length {
            let wanted = (length - data.len()).min(BUFFER_SIZE);
            let bytes = self.file.read_buffer(&mut chunk[..wanted])?;

            if bytes == 0 {
                return Err(FsError::TruncatedRead {
                    wanted: length,
                    got: data.len(),
                });
            }

            data.extend_from_slice(&chunk[..bytes]);
        }

        Ok(data)
    }

    /// Read everything from the current offset to end-of-stream
    ///
    /// A zero-byte read is normal completion, not a failure; an empty file
    /// yields an empty buffer.
    ///
    /// # Errors
    ///
    /// Returns [`FsError::Io`] only on a genuine read failure.
    pub fn read_to_end(&mut self) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        let mut chunk = [0u8; BUFFER_SIZE];

        loop {
            let bytes = self.file.read_buffer(&mut chunk)?;

            if bytes == 0 {
                return Ok(data);
            }

            data.extend_from_slice(&chunk[..bytes]);
        }
    }

    /// Read up to and including the next occurrence of `separator`
    ///
    /// Chunks are appended to a growing buffer and each freshly read chunk
    /// is scanned for the first occurrence of `separator`. On a match the
    /// handle is repositioned to the byte immediately following the
    /// separator, not wherever the last raw chunk read left the
    /// descriptor, and the bytes preceding the match are returned. A
    /// separator spanning a chunk boundary is not matched.
    ///
    /// At end-of-stream the final separator-less fragment is returned;
    /// `None` means nothing at all was left to read.
    ///
    /// # Errors
    ///
    /// Returns [`FsError::Io`] on a read failure.
    ///
    /// # Panics
    ///
    /// Panics if `separator` is empty.
    pub fn read_until_separator(&mut self, separator: &[u8]) -> Result<Option<Vec<u8>>> {
        assert!(!separator.is_empty(), "separator must not be empty");

        let mut data: Option<Vec<u8>> = None;
        let mut chunk = [0u8; BUFFER_SIZE];

        loop {
            let bytes = self.file.read_buffer(&mut chunk)?;

            if bytes == 0 {
                return Ok(data);
            }

            let total = data.get_or_insert_with(Vec::new);

            if let Some(index) = find_subsequence(&chunk[..bytes], separator) {
                total.extend_from_slice(&chunk[..index]);

                // Rewind to just past the separator so the next call resumes
                // there instead of at the end of this chunk.
                let resume = self.file.offset() - bytes as u64
                    + index as u64
                    + separator.len() as u64;
                self.file.seek(resume);

                return Ok(data);
            }

            total.extend_from_slice(&chunk[..bytes]);
        }
    }

    /// Read one newline-delimited line
    ///
    /// # Errors
    ///
    /// Returns [`FsError::NonUtf8`] if the line is not valid UTF-8, or
    /// [`FsError::Io`] on a read failure.
    pub fn read_line(&mut self) -> Result<Option<String>> {
        match self.read_until_separator(b"\n")? {
            Some(line) => Ok(Some(String::from_utf8(line)?)),
            None => Ok(None),
        }
    }

    /// Read the next line that is neither blank nor a `#` comment
    ///
    /// Returns `None` once the stream is exhausted without a further
    /// qualifying line.
    ///
    /// # Errors
    ///
    /// Returns [`FsError::NonUtf8`] or [`FsError::Io`] as
    /// [`BufferedReader::read_line`] does.
    pub fn read_config_line(&mut self) -> Result<Option<String>> {
        while let Some(line) = self.read_line()? {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            return Ok(Some(line));
        }

        Ok(None)
    }
}

/// First index of `needle` within `haystack`
fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}
