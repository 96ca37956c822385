//! # crossfs
//!
//! A **backend-abstract filesystem layer**: one uniform contract over
//! heterogeneous storage (local disks, in-memory trees, device or network
//! protocols), plus the generic algorithms that only need that contract —
//! transactional copy, recursive create/remove, and byte-exact content
//! comparison.
//!
//! Every path is an [`AfsPath`]: a backend handle paired with an opaque
//! path token only that backend knows how to interpret. Algorithms written
//! against [`AfsPath`] run unchanged on any backend pair, including
//! mixed-backend copies.
//!
//! ---
//!
//! ## Quick Start
//!
//! ```no_run
//! use crossfs::{AfsPath, CopyOptions, NativeBackend, copy_file, create_folder_all};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! fn backup(source_dir: &Path, target_dir: &Path) -> Result<(), crossfs::FsError> {
//!     let fs = Arc::new(NativeBackend::new());
//!     let source = AfsPath::new(fs.clone(), source_dir.join("data.db"));
//!     let target_parent = AfsPath::new(fs, target_dir);
//!
//!     create_folder_all(&target_parent)?;
//!     copy_file(
//!         &source,
//!         &target_parent.join("data.db"),
//!         CopyOptions { preserve_permissions: true, transactional: true },
//!         None,
//!         None,
//!     )?;
//!     Ok(())
//! }
//! ```
//!
//! ---
//!
//! ## Core Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`AfsPath`] | Backend handle + opaque path token; the universal path currency |
//! | [`Backend`] | Composite backend trait — kind, streams, item ops, traversal |
//! | [`FsError`] | Error taxonomy with path and operation context |
//! | [`TraversalSink`] | Visitor receiving per-entry callbacks during traversal |
//! | [`CopyAttributes`] | Size, mtime, and file identities captured by a copy |
//! | [`AdaptiveBlockSize`] | Latency-adaptive I/O block sizing state |
//! | [`NativeBackend`] | Backend over the local OS filesystem |
//!
//! ---
//!
//! ## Backend Contract
//!
//! A backend implements four component traits and gets [`Backend`] for
//! free through a blanket implementation:
//!
//! ```text
//! FsKind + FsStreams + FsOps + FsTraverse = Backend
//! ```
//!
//! [`FsKind`] names the backend family ([`BackendKind`]); two paths on the
//! same family unlock the backend's same-kind copy fast path.
//! [`FsStreams`] opens [`ReadStream`]/[`WriteStream`] pairs, [`FsOps`]
//! covers single-item operations (classify, create, remove, rename), and
//! [`FsTraverse`] enumerates folders into a [`TraversalSink`].
//!
//! ---
//!
//! ## Generic Algorithms
//!
//! | Function | Behavior |
//! |----------|----------|
//! | [`copy_file`] | Transactional copy: temp name, rename, best-effort rollback |
//! | [`copy_as_stream`] | Raw cross-backend byte copy through streams |
//! | [`create_folder_all`] | Idempotent recursive folder creation |
//! | [`remove_folder_all`] | Post-order recursive removal; never descends symlinks |
//! | [`files_have_same_content`] | Dual-buffer byte comparison with early mismatch exit |
//!
//! ---
//!
//! ## Error Handling
//!
//! All operations return `Result<T, FsError>`. Errors carry the path and,
//! where it matters, the operation:
//!
//! ```rust
//! use crossfs::FsError;
//! use std::path::PathBuf;
//!
//! let err = FsError::NotFound { path: PathBuf::from("/missing.txt") };
//! assert_eq!(err.to_string(), "not found: /missing.txt");
//! ```
//!
//! ---
//!
//! ## Thread Safety
//!
//! All backend traits require `Send + Sync` and take `&self`; a backend is
//! shared across threads as `Arc<dyn Backend>` (which is what [`AfsPath`]
//! holds, making paths cheap to clone and send). Streams are `Send` but
//! single-owner: each one carries its own handle and adaptive sizing state.
//!
//! ---
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `serde` | Serialization for the plain data types ([`CopyAttributes`], [`FileEntry`], etc.) |

// Private modules
mod block_size;
mod compare;
mod copy;
mod error;
mod native;
mod path;
mod traits;
mod tree;
mod types;

// Public re-exports - error type
pub use error::FsError;

// Public re-exports - core types
pub use types::{
    BackendKind, CopyAttributes, FileEntry, FileId, FolderEntry, ItemKind, SymlinkEntry,
};

// Public re-exports - path currency
pub use path::AfsPath;

// Public re-exports - backend contract
pub use traits::{
    Backend, FsKind, FsOps, FsStreams, FsTraverse, LinkAction, ReadStream, TraversalSink,
    WriteStream,
};

// Public re-exports - generic algorithms
pub use compare::files_have_same_content;
pub use copy::{
    CopyOptions, DeleteTargetFn, ProgressFn, TMP_FILE_SUFFIX, TMP_NAME_MAX_RETRIES,
    copy_as_stream, copy_file,
};
pub use tree::{FolderContents, NotifyFn, create_folder_all, remove_folder_all};

// Public re-exports - adaptive block sizing
pub use block_size::{AdaptiveBlockSize, DEFAULT_BLOCK_SIZE, MAX_BLOCK_SIZE};

// Public re-exports - backends
pub use native::NativeBackend;
