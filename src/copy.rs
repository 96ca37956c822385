//! Backend-independent file copy algorithms.
//!
//! Two layers: [`copy_as_stream`] moves bytes between any two backends
//! through their stream primitives, and [`copy_file`] adds same-backend
//! fast-path dispatch plus the transactional copy-to-temp-then-rename
//! protocol that keeps the window of a partially written target as small
//! as the backend's rename allows.

use tracing::{debug, warn};

use crate::{AfsPath, CopyAttributes, FsError, ReadStream, WriteStream};

/// Progress callback receiving a signed byte delta per I/O chunk.
///
/// Runs synchronously on the calling thread inside the I/O loop; returning
/// `Err` aborts the surrounding operation after all in-flight resources are
/// released. The lifetime parameter lets the closure borrow caller-local
/// state (counters, UI handles) for the duration of the call.
pub type ProgressFn<'a> = dyn FnMut(i64) -> Result<(), FsError> + 'a;

/// "About to delete the previous target" notification for
/// [`copy_file`]. In non-transactional mode the callback is also
/// responsible for actually clearing an existing target (moving it to
/// versioning, trash, or plain deletion); the copy itself then requires the
/// target path to be free.
pub type DeleteTargetFn<'a> = dyn FnMut() -> Result<(), FsError> + 'a;

/// Sentinel suffix marking in-flight transactional copy targets.
///
/// Appended to the target name while the copy runs; the finished temp file
/// is renamed onto the real target in one step. The marker must never
/// collide with a legitimate filename — when it does anyway, the copy
/// retries with a numeric disambiguator before the sentinel
/// (`name_1.crossfs.tmp`, `name_2.crossfs.tmp`, …).
pub const TMP_FILE_SUFFIX: &str = ".crossfs.tmp";

/// How many disambiguated temp names are tried after the plain one
/// collides before the original "already exists" error propagates.
///
/// Empirically chosen cap, kept as a named constant rather than re-derived.
pub const TMP_NAME_MAX_RETRIES: u32 = 10;

/// Options for [`copy_file`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CopyOptions {
    /// Carry source permissions to the target. Only honored on the
    /// same-backend fast path; requesting it across heterogeneous backends
    /// is a hard error, because attribute semantics are not portable.
    pub preserve_permissions: bool,
    /// Copy to a temp name and rename onto the target (see
    /// [`TMP_FILE_SUFFIX`]). When `false`, the copy writes straight to the
    /// final path — for backends that reject the temp-suffix pattern,
    /// removable targets that are cheaper to overwrite directly, and
    /// low-disk-space delete-before-write scenarios.
    pub transactional: bool,
}

/// Copy `source` to `target` through generic read/write streams.
///
/// Size, modification time, and identity are captured from the source
/// stream handle at open time (no separate stat, no TOCTOU drift) and the
/// write stream is seeded with them so backends can pre-allocate or set
/// metadata at creation. Bytes move through an unbuffered adaptive-block
/// loop reporting incremental deltas to `progress`.
///
/// # Errors
///
/// - [`FsError::Locked`] if the source is held exclusively elsewhere
/// - [`FsError::AlreadyExists`] if the target pre-exists
/// - any stream failure, and any error raised by `progress`
pub fn copy_as_stream(
    source: &AfsPath,
    target: &AfsPath,
    progress: Option<&mut ProgressFn<'_>>,
) -> Result<CopyAttributes, FsError> {
    let src = source.backend().open_read(source.item())?;
    let dst = target.backend().open_write(
        target.item(),
        Some(src.file_size()),
        Some(src.modification_time()),
    )?;
    stream_copy_raw(src, dst, progress)
}

/// Copy with already-open streams; shared by [`copy_as_stream`] and the
/// default [`FsStreams::copy_file_same_kind`](crate::FsStreams::copy_file_same_kind).
pub(crate) fn stream_copy_raw(
    mut src: Box<dyn ReadStream>,
    mut dst: Box<dyn WriteStream>,
    mut progress: Option<&mut ProgressFn<'_>>,
) -> Result<CopyAttributes, FsError> {
    let file_size = src.file_size();
    let modification_time = src.modification_time();
    let source_file_id = src.file_id();

    let mut buf = vec![0u8; src.block_size().max(dst.block_size())];
    loop {
        let want = src.block_size();
        if buf.len() < want {
            buf.resize(want, 0);
        }
        let read = src.read(&mut buf[..want])?;
        if read == 0 {
            break;
        }
        dst.write(&buf[..read])?;
        if let Some(report) = progress.as_mut() {
            report(read as i64)?;
        }
    }

    let target_file_id = dst.finalize()?;
    Ok(CopyAttributes {
        file_size,
        modification_time,
        source_file_id,
        target_file_id,
    })
}

/// Copy `source` onto `target`, optionally transactionally.
///
/// When source and target share a [`BackendKind`](crate::BackendKind), the
/// backend's [`copy_file_same_kind`](crate::FsStreams::copy_file_same_kind)
/// fast path runs (the only mode in which `preserve_permissions` is
/// honored); otherwise bytes fall back to the generic stream copy.
///
/// In transactional mode the copy lands under a temp name first and the
/// finished file is renamed onto `target` — the single point where a
/// previous target is replaced, atomically on backends whose rename is
/// atomic. (On filesystems with creation-time tunneling the replaced
/// file's creation time may survive; accepted platform limitation.) Any
/// failure after the temp file came into being removes it best-effort and
/// propagates the original error, never a secondary cleanup error.
///
/// `on_delete_target` fires once right before the previous target would
/// disappear: before the rename in transactional mode, before the copy in
/// non-transactional mode (where the callback also performs the removal —
/// see [`DeleteTargetFn`]).
///
/// # Errors
///
/// - [`FsError::CrossBackendAttributes`] if `preserve_permissions` is
///   requested across different backend kinds
/// - [`FsError::AlreadyExists`] after the temp-name retry budget
///   ([`TMP_NAME_MAX_RETRIES`]) is exhausted
/// - everything [`copy_as_stream`] can raise
pub fn copy_file(
    source: &AfsPath,
    target: &AfsPath,
    options: CopyOptions,
    mut on_delete_target: Option<&mut DeleteTargetFn<'_>>,
    mut progress: Option<&mut ProgressFn<'_>>,
) -> Result<CopyAttributes, FsError> {
    if options.preserve_permissions && !source.same_backend_kind(target) {
        return Err(FsError::CrossBackendAttributes {
            source_kind: source.kind(),
            target_kind: target.kind(),
        });
    }
    debug!(%source, %target, transactional = options.transactional, "copying file");

    if !options.transactional {
        if let Some(notify) = on_delete_target.as_mut() {
            notify()?;
        }
        return copy_pass(
            source,
            target,
            options.preserve_permissions,
            progress.as_deref_mut(),
        );
    }

    let parent = target.parent().ok_or_else(|| FsError::Io {
        operation: "copy_file",
        path: target.item().to_path_buf(),
        source: std::io::Error::other("transactional copy target has no parent"),
    })?;
    let base = target.name();

    let mut attempt: u32 = 0;
    loop {
        let tmp_name = if attempt == 0 {
            format!("{base}{TMP_FILE_SUFFIX}")
        } else {
            format!("{base}_{attempt}{TMP_FILE_SUFFIX}")
        };
        let tmp = parent.join(&tmp_name);

        match copy_pass(
            source,
            &tmp,
            options.preserve_permissions,
            progress.as_deref_mut(),
        ) {
            Ok(attrs) => {
                if let Some(notify) = on_delete_target.as_mut() {
                    if let Err(abort) = notify() {
                        remove_temp_best_effort(&tmp);
                        return Err(abort);
                    }
                }
                if let Err(rename_err) = target.backend().rename(tmp.item(), target.item()) {
                    remove_temp_best_effort(&tmp);
                    return Err(rename_err);
                }
                return Ok(attrs);
            }
            // Stray temp name from a previous run or a concurrent copy; not
            // ours, so nothing to clean up. Retry with the next suffix.
            Err(e) if e.is_already_exists() && attempt < TMP_NAME_MAX_RETRIES => {
                attempt += 1;
            }
            Err(e) => {
                if !e.is_already_exists() {
                    remove_temp_best_effort(&tmp);
                }
                return Err(e);
            }
        }
    }
}

/// Same-kind fast path vs. generic stream fallback.
fn copy_pass(
    source: &AfsPath,
    target: &AfsPath,
    preserve_permissions: bool,
    progress: Option<&mut ProgressFn<'_>>,
) -> Result<CopyAttributes, FsError> {
    if source.same_backend_kind(target) {
        source.backend().copy_file_same_kind(
            source.item(),
            target.backend(),
            target.item(),
            preserve_permissions,
            progress,
        )
    } else {
        // preserve_permissions was already rejected for this combination.
        copy_as_stream(source, target, progress)
    }
}

/// Rollback helper: the original error is what the caller must see, so a
/// failure to delete the stray temp file is logged and swallowed.
fn remove_temp_best_effort(tmp: &AfsPath) {
    if let Err(cleanup_err) = tmp.backend().remove_file(tmp.item()) {
        if !cleanup_err.is_not_found() {
            warn!(%tmp, error = %cleanup_err, "failed to clean up temp copy target");
        }
    }
}
