//! Native OS filesystem backend.
//!
//! [`NativeBackend`] implements the full backend contract on top of
//! `std::fs`. Stream metadata (size, modification time, identity) is read
//! from the open handle rather than a separate stat call, and both stream
//! types carry their own [`AdaptiveBlockSize`] state.
//!
//! Portability note: symlink loop prevention during traversal relies on
//! the OS-level limit on symlink chain length (`ELOOP`); there is no
//! explicit visited-set tracking.

mod traverse;

use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use crate::block_size::AdaptiveBlockSize;
use crate::{
    Backend, BackendKind, CopyAttributes, FileId, FsError, FsKind, FsOps, FsStreams, ItemKind,
    ProgressFn, ReadStream, WriteStream,
};

/// Backend for the local OS filesystem.
///
/// Path tokens are ordinary OS paths; the OS resolves them, including
/// relative components and symlinks where an operation follows them.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeBackend;

impl NativeBackend {
    /// A native backend instance. Stateless; all state lives in the
    /// streams it hands out.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// Map an `io::Error` to the crossfs taxonomy for general operations.
pub(crate) fn io_error(operation: &'static str, path: &Path, source: io::Error) -> FsError {
    match source.kind() {
        ErrorKind::NotFound => FsError::NotFound {
            path: path.to_path_buf(),
        },
        ErrorKind::AlreadyExists => FsError::AlreadyExists {
            path: path.to_path_buf(),
            operation,
        },
        ErrorKind::ResourceBusy => FsError::Locked {
            path: path.to_path_buf(),
            operation,
        },
        ErrorKind::NotADirectory => FsError::NotADirectory {
            path: path.to_path_buf(),
        },
        _ => FsError::Io {
            operation,
            path: path.to_path_buf(),
            source,
        },
    }
}

/// Like [`io_error`], but in a creation context `NotFound` means the
/// parent chain is incomplete.
fn create_error(operation: &'static str, path: &Path, source: io::Error) -> FsError {
    if source.kind() == ErrorKind::NotFound {
        FsError::ParentMissing {
            path: path.to_path_buf(),
            operation,
        }
    } else {
        io_error(operation, path, source)
    }
}

#[cfg(unix)]
pub(crate) fn mtime_of(meta: &fs::Metadata) -> i64 {
    use std::os::unix::fs::MetadataExt;
    meta.mtime()
}

#[cfg(not(unix))]
pub(crate) fn mtime_of(meta: &fs::Metadata) -> i64 {
    match meta.modified() {
        Ok(t) => match t.duration_since(UNIX_EPOCH) {
            Ok(d) => d.as_secs() as i64,
            Err(e) => -(e.duration().as_secs() as i64),
        },
        Err(_) => 0,
    }
}

#[cfg(unix)]
pub(crate) fn file_id_of(meta: &fs::Metadata) -> FileId {
    use std::os::unix::fs::MetadataExt;
    FileId::new(meta.dev(), meta.ino())
}

#[cfg(not(unix))]
pub(crate) fn file_id_of(_meta: &fs::Metadata) -> FileId {
    FileId::UNKNOWN
}

fn system_time_from_unix(secs: i64) -> SystemTime {
    if secs >= 0 {
        UNIX_EPOCH + Duration::from_secs(secs as u64)
    } else {
        UNIX_EPOCH - Duration::from_secs(secs.unsigned_abs())
    }
}

struct NativeReadStream {
    file: File,
    path: PathBuf,
    size: u64,
    mtime: i64,
    id: FileId,
    sizing: AdaptiveBlockSize,
}

impl ReadStream for NativeReadStream {
    fn block_size(&self) -> usize {
        self.sizing.recommended()
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, FsError> {
        let started = Instant::now();
        let read = self
            .file
            .read(buf)
            .map_err(|e| io_error("read", &self.path, e))?;
        let now = Instant::now();
        self.sizing.after_io(now.duration_since(started), now);
        Ok(read)
    }

    fn file_size(&self) -> u64 {
        self.size
    }

    fn modification_time(&self) -> i64 {
        self.mtime
    }

    fn file_id(&self) -> FileId {
        self.id
    }
}

struct NativeWriteStream {
    file: File,
    path: PathBuf,
    expected_mtime: Option<i64>,
    sizing: AdaptiveBlockSize,
}

impl WriteStream for NativeWriteStream {
    fn block_size(&self) -> usize {
        self.sizing.recommended()
    }

    fn write(&mut self, buf: &[u8]) -> Result<(), FsError> {
        let started = Instant::now();
        self.file
            .write_all(buf)
            .map_err(|e| io_error("write", &self.path, e))?;
        let now = Instant::now();
        self.sizing.after_io(now.duration_since(started), now);
        Ok(())
    }

    fn finalize(self: Box<Self>) -> Result<FileId, FsError> {
        let Self {
            mut file,
            path,
            expected_mtime,
            ..
        } = *self;
        file.flush().map_err(|e| io_error("flush", &path, e))?;
        if let Some(mtime) = expected_mtime {
            file.set_modified(system_time_from_unix(mtime))
                .map_err(|e| io_error("set_modified", &path, e))?;
        }
        let meta = file
            .metadata()
            .map_err(|e| io_error("metadata", &path, e))?;
        Ok(file_id_of(&meta))
    }
}

impl FsKind for NativeBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Native
    }
}

impl FsStreams for NativeBackend {
    fn open_read(&self, path: &Path) -> Result<Box<dyn ReadStream>, FsError> {
        let file = File::open(path).map_err(|e| io_error("open_read", path, e))?;
        let meta = file
            .metadata()
            .map_err(|e| io_error("open_read", path, e))?;
        Ok(Box::new(NativeReadStream {
            size: meta.len(),
            mtime: mtime_of(&meta),
            id: file_id_of(&meta),
            file,
            path: path.to_path_buf(),
            sizing: AdaptiveBlockSize::new(),
        }))
    }

    fn open_write(
        &self,
        path: &Path,
        _expected_size: Option<u64>,
        expected_mtime: Option<i64>,
    ) -> Result<Box<dyn WriteStream>, FsError> {
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| create_error("open_write", path, e))?;
        Ok(Box::new(NativeWriteStream {
            file,
            path: path.to_path_buf(),
            expected_mtime,
            sizing: AdaptiveBlockSize::new(),
        }))
    }

    fn copy_file_same_kind(
        &self,
        from: &Path,
        target: &dyn Backend,
        to: &Path,
        preserve_permissions: bool,
        progress: Option<&mut ProgressFn<'_>>,
    ) -> Result<CopyAttributes, FsError> {
        // Same kind means `to` is an OS path too, whichever instance owns it.
        // The bytes come from the resolved file, so the mode must too: a
        // symlink source would otherwise contribute the link's own mode.
        let permissions = if preserve_permissions {
            let meta = fs::metadata(from).map_err(|e| io_error("copy_file", from, e))?;
            Some(meta.permissions())
        } else {
            None
        };

        let src = self.open_read(from)?;
        let dst = target.open_write(to, Some(src.file_size()), Some(src.modification_time()))?;
        let attrs = crate::copy::stream_copy_raw(src, dst, progress)?;

        if let Some(perm) = permissions {
            fs::set_permissions(to, perm).map_err(|e| io_error("set_permissions", to, e))?;
        }
        Ok(attrs)
    }
}

impl FsOps for NativeBackend {
    fn item_type(&self, path: &Path) -> Result<Option<ItemKind>, FsError> {
        match fs::symlink_metadata(path) {
            Ok(meta) => Ok(Some(classify(&meta))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error("item_type", path, e)),
        }
    }

    fn resolved_item_type(&self, path: &Path) -> Result<Option<ItemKind>, FsError> {
        match fs::metadata(path) {
            Ok(meta) => Ok(Some(classify(&meta))),
            // Also the broken-symlink case: the link exists, its target is gone.
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error("resolved_item_type", path, e)),
        }
    }

    fn create_folder(&self, path: &Path) -> Result<(), FsError> {
        fs::create_dir(path).map_err(|e| create_error("create_folder", path, e))
    }

    fn remove_file(&self, path: &Path) -> Result<(), FsError> {
        fs::remove_file(path).map_err(|e| io_error("remove_file", path, e))
    }

    fn remove_symlink(&self, path: &Path) -> Result<(), FsError> {
        // Windows represents directory links as directories; try that
        // removal first, everything else is a file-style link.
        #[cfg(windows)]
        {
            if fs::remove_dir(path).is_ok() {
                return Ok(());
            }
        }
        fs::remove_file(path).map_err(|e| io_error("remove_symlink", path, e))
    }

    fn remove_folder(&self, path: &Path) -> Result<(), FsError> {
        fs::remove_dir(path).map_err(|e| io_error("remove_folder", path, e))
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<(), FsError> {
        fs::rename(from, to).map_err(|e| io_error("rename", from, e))
    }
}

fn classify(meta: &fs::Metadata) -> ItemKind {
    if meta.is_symlink() {
        ItemKind::Symlink
    } else if meta.is_dir() {
        ItemKind::Folder
    } else {
        ItemKind::File
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        AfsPath, CopyOptions, copy_as_stream, copy_file, create_folder_all, remove_folder_all,
    };
    use std::sync::Arc;
    use tempfile::tempdir;

    fn native_path(path: &Path) -> AfsPath {
        AfsPath::new(Arc::new(NativeBackend::new()), path)
    }

    #[test]
    fn item_type_classifies_files_and_folders() {
        let dir = tempdir().unwrap();
        let backend = NativeBackend::new();

        let file = dir.path().join("a.txt");
        fs::write(&file, b"x").unwrap();

        assert_eq!(backend.item_type(&file).unwrap(), Some(ItemKind::File));
        assert_eq!(
            backend.item_type(dir.path()).unwrap(),
            Some(ItemKind::Folder)
        );
        assert_eq!(
            backend.item_type(&dir.path().join("missing")).unwrap(),
            None
        );
    }

    #[cfg(unix)]
    #[test]
    fn item_type_reports_symlinks_unresolved() {
        let dir = tempdir().unwrap();
        let backend = NativeBackend::new();

        let target = dir.path().join("real");
        fs::create_dir(&target).unwrap();
        let link = dir.path().join("link");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        assert_eq!(backend.item_type(&link).unwrap(), Some(ItemKind::Symlink));
        assert_eq!(
            backend.resolved_item_type(&link).unwrap(),
            Some(ItemKind::Folder)
        );
    }

    #[cfg(unix)]
    #[test]
    fn broken_symlink_resolves_to_none() {
        let dir = tempdir().unwrap();
        let backend = NativeBackend::new();

        let link = dir.path().join("dangling");
        std::os::unix::fs::symlink(dir.path().join("gone"), &link).unwrap();

        assert_eq!(backend.item_type(&link).unwrap(), Some(ItemKind::Symlink));
        assert_eq!(backend.resolved_item_type(&link).unwrap(), None);
    }

    #[test]
    fn create_folder_requires_parent() {
        let dir = tempdir().unwrap();
        let backend = NativeBackend::new();

        let err = backend
            .create_folder(&dir.path().join("a/b/c"))
            .unwrap_err();
        assert!(err.is_parent_missing());
    }

    #[test]
    fn open_write_rejects_existing_target() {
        let dir = tempdir().unwrap();
        let backend = NativeBackend::new();

        let file = dir.path().join("a.txt");
        fs::write(&file, b"x").unwrap();

        let err = backend.open_write(&file, None, None).map(|_| ()).unwrap_err();
        assert!(err.is_already_exists());
    }

    #[test]
    fn stream_copy_preserves_size_and_mtime() {
        let dir = tempdir().unwrap();

        let source = dir.path().join("src.bin");
        let payload: Vec<u8> = (0..100_000u32).map(|i| (i % 251) as u8).collect();
        fs::write(&source, &payload).unwrap();
        let source_meta = fs::metadata(&source).unwrap();

        let target = dir.path().join("dst.bin");
        let attrs = copy_as_stream(&native_path(&source), &native_path(&target), None).unwrap();

        assert_eq!(attrs.file_size, payload.len() as u64);
        assert_eq!(attrs.modification_time, mtime_of(&source_meta));
        assert_eq!(fs::read(&target).unwrap(), payload);

        let target_meta = fs::metadata(&target).unwrap();
        assert_eq!(mtime_of(&target_meta), mtime_of(&source_meta));
        assert_eq!(attrs.target_file_id, file_id_of(&target_meta));
    }

    #[cfg(unix)]
    #[test]
    fn same_kind_copy_preserves_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let source = dir.path().join("script.sh");
        fs::write(&source, b"#!/bin/sh\n").unwrap();
        fs::set_permissions(&source, fs::Permissions::from_mode(0o750)).unwrap();

        let target = dir.path().join("copy.sh");
        copy_file(
            &native_path(&source),
            &native_path(&target),
            CopyOptions {
                preserve_permissions: true,
                transactional: true,
            },
            None,
            None,
        )
        .unwrap();

        let mode = fs::metadata(&target).unwrap().permissions().mode() & 0o7777;
        assert_eq!(mode, 0o750);
    }

    #[test]
    fn transactional_copy_replaces_existing_target() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("new.txt");
        fs::write(&source, b"new contents").unwrap();
        let target = dir.path().join("out.txt");
        fs::write(&target, b"old contents").unwrap();

        let mut deletions = 0;
        let mut notify = || -> Result<(), FsError> {
            deletions += 1;
            Ok(())
        };
        copy_file(
            &native_path(&source),
            &native_path(&target),
            CopyOptions {
                preserve_permissions: false,
                transactional: true,
            },
            Some(&mut notify),
            None,
        )
        .unwrap();

        assert_eq!(deletions, 1);
        assert_eq!(fs::read(&target).unwrap(), b"new contents");
        // No stray temp file may survive.
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|n| n.contains(crate::TMP_FILE_SUFFIX))
            .collect();
        assert!(leftovers.is_empty(), "leftover temp files: {leftovers:?}");
    }

    #[test]
    fn create_folder_all_builds_missing_chain() {
        let dir = tempdir().unwrap();
        let deep = native_path(&dir.path().join("a/b/c/d"));

        create_folder_all(&deep).unwrap();
        assert!(deep.is_folder().unwrap());

        // Second call is a no-op, not an error.
        create_folder_all(&deep).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn copy_through_a_link_preserves_the_resolved_file_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let real = dir.path().join("real.txt");
        fs::write(&real, b"data").unwrap();
        fs::set_permissions(&real, fs::Permissions::from_mode(0o640)).unwrap();
        let link = dir.path().join("link.txt");
        std::os::unix::fs::symlink(&real, &link).unwrap();

        let target = dir.path().join("copy.txt");
        copy_file(
            &native_path(&link),
            &native_path(&target),
            CopyOptions {
                preserve_permissions: true,
                transactional: true,
            },
            None,
            None,
        )
        .unwrap();

        // The file's mode, not the link's (0o777 on Linux).
        let mode = fs::metadata(&target).unwrap().permissions().mode() & 0o7777;
        assert_eq!(mode, 0o640);
    }

    #[cfg(unix)]
    #[test]
    fn remove_folder_all_leaves_symlink_targets_alone() {
        let dir = tempdir().unwrap();
        let outside = dir.path().join("outside");
        fs::create_dir(&outside).unwrap();
        fs::write(outside.join("keep.txt"), b"precious").unwrap();
        let tree = dir.path().join("tree");
        fs::create_dir(&tree).unwrap();
        fs::write(tree.join("own.txt"), b"x").unwrap();
        std::os::unix::fs::symlink(&outside, tree.join("link")).unwrap();

        remove_folder_all(&native_path(&tree), None, None).unwrap();

        assert!(!tree.exists());
        assert_eq!(fs::read(outside.join("keep.txt")).unwrap(), b"precious");
    }

    #[test]
    fn progress_receives_all_copied_bytes() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("src.bin");
        let payload = vec![7u8; 200_000];
        fs::write(&source, &payload).unwrap();

        let mut reported = 0i64;
        let mut progress = |delta: i64| -> Result<(), FsError> {
            reported += delta;
            Ok(())
        };
        copy_as_stream(
            &native_path(&source),
            &native_path(&dir.path().join("dst.bin")),
            Some(&mut progress),
        )
        .unwrap();
        assert_eq!(reported, payload.len() as i64);
    }
}
