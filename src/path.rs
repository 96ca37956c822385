//! Backend-addressed paths.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::{Backend, BackendKind, FsError, ItemKind};

/// A backend handle plus an opaque item token — the unit of addressing for
/// every crossfs operation.
///
/// The token is never interpreted by generic code; it is only handed back
/// to the owning backend, or turned into related tokens through the
/// backend's own [`parent_of`](crate::FsOps::parent_of) /
/// [`join`](crate::FsOps::join) primitives. Two `AfsPath` values are only
/// meaningfully comparable when they belong to the same
/// [`BackendKind`]; cross-backend operations check
/// [`same_backend_kind`](Self::same_backend_kind) explicitly to pick a
/// fast path versus the generic stream fallback.
#[derive(Clone)]
pub struct AfsPath {
    backend: Arc<dyn Backend>,
    item: PathBuf,
}

impl AfsPath {
    /// Address `item` on `backend`.
    pub fn new(backend: Arc<dyn Backend>, item: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            item: item.into(),
        }
    }

    /// The owning backend.
    #[must_use]
    pub fn backend(&self) -> &dyn Backend {
        &*self.backend
    }

    /// The opaque item token.
    #[must_use]
    pub fn item(&self) -> &Path {
        &self.item
    }

    /// Discriminant of the owning backend.
    #[must_use]
    pub fn kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// `true` when `other` lives on the same backend kind, making
    /// same-backend fast paths valid.
    #[must_use]
    pub fn same_backend_kind(&self, other: &AfsPath) -> bool {
        self.backend.kind() == other.backend.kind()
    }

    /// The parent path on the same backend, or `None` at a root.
    #[must_use]
    pub fn parent(&self) -> Option<AfsPath> {
        self.backend.parent_of(&self.item).map(|parent| AfsPath {
            backend: Arc::clone(&self.backend),
            item: parent,
        })
    }

    /// A child of this path on the same backend.
    #[must_use]
    pub fn join(&self, name: &str) -> AfsPath {
        AfsPath {
            backend: Arc::clone(&self.backend),
            item: self.backend.join(&self.item, name),
        }
    }

    /// The last component of the token as a display name.
    #[must_use]
    pub fn name(&self) -> String {
        self.backend.item_name(&self.item)
    }

    /// Classify this item without following symlinks; `Ok(None)` = missing.
    pub fn item_type(&self) -> Result<Option<ItemKind>, FsError> {
        self.backend.item_type(&self.item)
    }

    /// `true` if anything exists at this path (link-unresolved).
    pub fn exists(&self) -> Result<bool, FsError> {
        Ok(self.item_type()?.is_some())
    }

    /// `true` if a regular file exists at this path.
    pub fn is_file(&self) -> Result<bool, FsError> {
        Ok(self.item_type()? == Some(ItemKind::File))
    }

    /// `true` if a real directory exists at this path.
    pub fn is_folder(&self) -> Result<bool, FsError> {
        Ok(self.item_type()? == Some(ItemKind::Folder))
    }
}

impl fmt::Debug for AfsPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AfsPath")
            .field("kind", &self.backend.kind())
            .field("item", &self.item)
            .finish()
    }
}

impl fmt::Display for AfsPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.item.display())
    }
}
