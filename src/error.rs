//! Error types for the crossfs filesystem abstraction.

use std::path::PathBuf;

use crate::BackendKind;

/// Filesystem error type with contextual variants.
///
/// All error variants include relevant context (path, operation) where applicable.
/// Uses `#[non_exhaustive]` for forward compatibility.
///
/// Three variants are *distinguished sub-kinds* that the generic algorithms
/// branch on: [`AlreadyExists`](FsError::AlreadyExists) (drives the
/// transactional-copy temp-name retry and the idempotent branch of recursive
/// folder creation), [`ParentMissing`](FsError::ParentMissing) (drives the
/// walk-up retry of recursive folder creation), and
/// [`Locked`](FsError::Locked) (surfaced to the caller, which owns any retry
/// policy). Everything else is an environmental failure that propagates
/// unchanged.
///
/// # Examples
///
/// ```rust
/// use crossfs::FsError;
/// use std::path::PathBuf;
///
/// let err = FsError::NotFound { path: PathBuf::from("/missing") };
/// assert!(err.to_string().contains("/missing"));
/// ```
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum FsError {
    /// Path does not exist.
    #[error("not found: {path}")]
    NotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// Path already exists when it shouldn't.
    #[error("{operation}: already exists: {path}")]
    AlreadyExists {
        /// The path that already exists.
        path: PathBuf,
        /// The operation that failed.
        operation: &'static str,
    },

    /// A parent component of the path does not exist.
    #[error("{operation}: parent path missing: {path}")]
    ParentMissing {
        /// The path whose parent chain is incomplete.
        path: PathBuf,
        /// The operation that failed.
        operation: &'static str,
    },

    /// The item exists but is held exclusively by another process.
    #[error("{operation}: resource locked: {path}")]
    Locked {
        /// The locked path.
        path: PathBuf,
        /// The operation that failed.
        operation: &'static str,
    },

    /// Expected a directory but found something else.
    #[error("not a directory: {path}")]
    NotADirectory {
        /// The path that is not a directory.
        path: PathBuf,
    },

    /// Expected a file but found something else.
    #[error("not a file: {path}")]
    NotAFile {
        /// The path that is not a file.
        path: PathBuf,
    },

    /// Attribute preservation was requested across two different backend kinds.
    ///
    /// Permission semantics are not portable between heterogeneous backends,
    /// so this is a hard error rather than a silent downgrade.
    #[error("cannot preserve permissions across backends: {source_kind:?} -> {target_kind:?}")]
    CrossBackendAttributes {
        /// Kind of the backend owning the source path.
        source_kind: BackendKind,
        /// Kind of the backend owning the target path.
        target_kind: BackendKind,
    },

    /// Operation aborted by a caller-supplied callback.
    #[error("operation aborted: {reason}")]
    Aborted {
        /// Why the callback aborted.
        reason: String,
    },

    /// Generic backend error.
    #[error("backend error: {0}")]
    Backend(String),

    /// I/O error with context.
    #[error("{operation} failed for {path}: {source}")]
    Io {
        /// The operation that failed.
        operation: &'static str,
        /// The path involved in the operation.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl FsError {
    /// `true` for the distinguished "target already exists" sub-kind.
    #[must_use]
    pub fn is_already_exists(&self) -> bool {
        matches!(self, FsError::AlreadyExists { .. })
    }

    /// `true` for the distinguished "parent path missing" sub-kind.
    #[must_use]
    pub fn is_parent_missing(&self) -> bool {
        matches!(self, FsError::ParentMissing { .. })
    }

    /// `true` for the distinguished "resource locked" sub-kind.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        matches!(self, FsError::Locked { .. })
    }

    /// `true` if the path simply does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, FsError::NotFound { .. })
    }
}

impl From<std::io::Error> for FsError {
    fn from(error: std::io::Error) -> Self {
        // Convert common io::ErrorKind to the distinguished variants when possible
        match error.kind() {
            std::io::ErrorKind::NotFound => FsError::NotFound {
                path: PathBuf::new(),
            },
            std::io::ErrorKind::AlreadyExists => FsError::AlreadyExists {
                path: PathBuf::new(),
                operation: "io",
            },
            std::io::ErrorKind::ResourceBusy => FsError::Locked {
                path: PathBuf::new(),
                operation: "io",
            },
            std::io::ErrorKind::NotADirectory => FsError::NotADirectory {
                path: PathBuf::new(),
            },
            _ => FsError::Io {
                operation: "io",
                path: PathBuf::new(),
                source: error,
            },
        }
    }
}
