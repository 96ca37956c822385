//! Stream-based file I/O for filesystem backends.

use std::path::Path;

use crate::{CopyAttributes, FileId, FsError, ProgressFn};

/// An open read stream on a backend file.
///
/// The stream captures `file_size`, `modification_time`, and `file_id` from
/// the open handle itself, not from a separate stat call, so the reported
/// attributes cannot drift from the bytes actually read.
///
/// # Object Safety
///
/// This trait is object-safe; backends return `Box<dyn ReadStream>`.
pub trait ReadStream: Send {
    /// Recommended size for the next read, in bytes.
    ///
    /// Backends with latency-adaptive sizing update this after every read;
    /// the state is private to this stream instance.
    fn block_size(&self) -> usize;

    /// Read up to `buf.len()` bytes, returning the number read.
    ///
    /// Returns `Ok(0)` at end of stream. Partial reads are allowed.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, FsError>;

    /// File size in bytes, as observed when the stream was opened.
    fn file_size(&self) -> u64;

    /// Modification time (seconds since the Unix epoch), as observed when
    /// the stream was opened.
    fn modification_time(&self) -> i64;

    /// Stable identity of the open file, or [`FileId::UNKNOWN`].
    fn file_id(&self) -> FileId;
}

/// An open write stream on a backend file.
///
/// Created by [`FsStreams::open_write`], which fails if the target already
/// exists. Dropping the stream without calling
/// [`finalize`](WriteStream::finalize) abandons the write; cleaning up the
/// partial target is the caller's concern (the transactional copy layer
/// does this).
pub trait WriteStream: Send {
    /// Recommended size for the next write, in bytes.
    fn block_size(&self) -> usize;

    /// Write the whole buffer.
    fn write(&mut self, buf: &[u8]) -> Result<(), FsError>;

    /// Flush, apply the expected modification time, close, and report the
    /// identity of the written target (or [`FileId::UNKNOWN`]).
    fn finalize(self: Box<Self>) -> Result<FileId, FsError>;
}

/// Stream-open operations for a filesystem backend.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync`. Methods use `&self`; each
/// returned stream owns its handle and carries no shared mutable state.
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn FsStreams`.
pub trait FsStreams: Send + Sync {
    /// Open a file for reading.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the path does not exist
    /// - [`FsError::Locked`] if another process holds the file exclusively
    fn open_read(&self, path: &Path) -> Result<Box<dyn ReadStream>, FsError>;

    /// Open a file for writing. The target must not already exist.
    ///
    /// `expected_size` and `expected_mtime` are the source attributes the
    /// finished file should carry; backends may use them to pre-allocate or
    /// to set metadata atomically at creation. The modification time is
    /// applied no later than [`WriteStream::finalize`].
    ///
    /// # Errors
    ///
    /// - [`FsError::AlreadyExists`] if the target pre-exists
    /// - [`FsError::ParentMissing`] if the parent directory does not exist
    fn open_write(
        &self,
        path: &Path,
        expected_size: Option<u64>,
        expected_mtime: Option<i64>,
    ) -> Result<Box<dyn WriteStream>, FsError>;

    /// Copy a file between two backends of the *same kind*.
    ///
    /// Called by [`copy_file`](crate::copy_file) only after the
    /// [`BackendKind`](crate::BackendKind) discriminants of source and
    /// target matched, so `to` is a token this backend family understands
    /// even when `target` is a different instance.
    ///
    /// The default implementation streams bytes through
    /// [`open_read`](Self::open_read)/[`open_write`](FsStreams::open_write)
    /// and rejects `preserve_permissions`; backends with portable attribute
    /// semantics (e.g. the native backend) override it.
    ///
    /// # Errors
    ///
    /// - [`FsError::AlreadyExists`] if the target pre-exists
    /// - [`FsError::Backend`] if `preserve_permissions` is requested and the
    ///   backend cannot honor it
    /// - any error raised by the progress callback
    fn copy_file_same_kind(
        &self,
        from: &Path,
        target: &dyn crate::Backend,
        to: &Path,
        preserve_permissions: bool,
        progress: Option<&mut ProgressFn<'_>>,
    ) -> Result<CopyAttributes, FsError> {
        if preserve_permissions {
            return Err(FsError::Backend(
                "backend does not support permission preservation".into(),
            ));
        }
        let src = self.open_read(from)?;
        let dst = target.open_write(to, Some(src.file_size()), Some(src.modification_time()))?;
        crate::copy::stream_copy_raw(src, dst, progress)
    }
}
