//! # Backend Traits
//!
//! The trait surface every crossfs backend implements.
//!
//! ## Trait Layout
//!
//! One trait per concern, composed into a single [`Backend`] supertrait:
//!
//! ```text
//! FsKind + FsStreams + FsOps + FsTraverse = Backend
//! ```
//!
//! | Trait | Concern |
//! |-------|---------|
//! | [`FsKind`] | Backend discriminant for same-backend detection |
//! | [`FsStreams`] | Open read/write streams, same-kind fast-path copy |
//! | [`FsOps`] | Simple create/remove/rename/classify primitives |
//! | [`FsTraverse`] | One-level directory traversal with callbacks |
//!
//! ## Blanket Implementation
//!
//! [`Backend`] has a blanket implementation: implement the four component
//! traits and the composite comes for free. Generic algorithms
//! ([`copy_file`](crate::copy_file), [`remove_folder_all`](crate::remove_folder_all), …)
//! only ever see `dyn Backend` behind an [`AfsPath`](crate::AfsPath).
//!
//! ## Thread Safety
//!
//! All traits require `Send + Sync` and take `&self`; backends use interior
//! mutability where they need state. Generic algorithms themselves hold no
//! shared mutable state between top-level calls.

mod fs_ops;
mod fs_streams;
mod fs_traverse;

pub use fs_ops::FsOps;
pub use fs_streams::{FsStreams, ReadStream, WriteStream};
pub use fs_traverse::{FsTraverse, LinkAction, TraversalSink};

use crate::BackendKind;

/// Backend self-identification.
///
/// The generic algorithms use the returned discriminant to decide whether
/// two [`AfsPath`](crate::AfsPath) values live on the "same backend" — the
/// check is on this closed tag, never on runtime type comparison, so the
/// set of valid same-backend pairings stays explicit.
pub trait FsKind: Send + Sync {
    /// Which backend family this instance belongs to.
    fn kind(&self) -> BackendKind;
}

/// A complete filesystem backend.
///
/// # Blanket Implementation
///
/// Automatically implemented for any type that implements all four
/// component traits. You never implement `Backend` directly.
///
/// # Example
///
/// ```rust,ignore
/// use crossfs::{AfsPath, NativeBackend};
/// use std::sync::Arc;
///
/// let backend: Arc<dyn crossfs::Backend> = Arc::new(NativeBackend::new());
/// let path = AfsPath::new(backend, "/tmp/data");
/// ```
pub trait Backend: FsKind + FsStreams + FsOps + FsTraverse {}

// Blanket implementation - any type implementing all four gets Backend for free
impl<T: FsKind + FsStreams + FsOps + FsTraverse> Backend for T {}
