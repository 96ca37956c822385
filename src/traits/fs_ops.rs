//! Simple (non-recursive) item operations for filesystem backends.

use std::path::{Path, PathBuf};

use crate::{FsError, ItemKind};

/// Simple item operations for a filesystem backend.
///
/// Everything here is a single primitive — no recursion, no retries. The
/// generic algorithms ([`create_folder_all`](crate::create_folder_all),
/// [`remove_folder_all`](crate::remove_folder_all),
/// [`copy_file`](crate::copy_file)) compose these into the transactional
/// and recursive behaviors.
///
/// # Path tokens
///
/// The `Path` arguments are *backend-opaque tokens*: generic code never
/// interprets them, it only passes them back to the owning backend or
/// derives related tokens through [`parent_of`](Self::parent_of),
/// [`item_name`](Self::item_name), and [`join`](Self::join). The default
/// implementations of those three cover backends whose tokens are ordinary
/// hierarchical paths.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync`. Methods use `&self`.
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn FsOps`.
pub trait FsOps: Send + Sync {
    /// Classify the item at `path` without following symlinks.
    ///
    /// Returns `Ok(None)` if nothing exists there; only genuine I/O
    /// failures produce an error.
    fn item_type(&self, path: &Path) -> Result<Option<ItemKind>, FsError>;

    /// Classify the item at `path`, following symlinks.
    ///
    /// Returns `Ok(None)` if nothing exists there, including a symlink
    /// whose target is gone.
    fn resolved_item_type(&self, path: &Path) -> Result<Option<ItemKind>, FsError>;

    /// Create a single directory; the parent must exist.
    ///
    /// # Errors
    ///
    /// - [`FsError::AlreadyExists`] if the path already exists
    /// - [`FsError::ParentMissing`] if the parent directory does not exist
    fn create_folder(&self, path: &Path) -> Result<(), FsError>;

    /// Remove a file.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the file does not exist
    fn remove_file(&self, path: &Path) -> Result<(), FsError>;

    /// Remove a symlink itself, never its target.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the link does not exist
    fn remove_symlink(&self, path: &Path) -> Result<(), FsError>;

    /// Remove an empty directory.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the path does not exist
    /// - [`FsError::NotADirectory`] if the path is not a directory
    fn remove_folder(&self, path: &Path) -> Result<(), FsError>;

    /// Rename `from` onto `to`, replacing an existing `to` atomically where
    /// the backend supports it.
    ///
    /// This is the single point where a transactional copy swaps the
    /// finished temp file onto the final target.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if `from` does not exist
    fn rename(&self, from: &Path, to: &Path) -> Result<(), FsError>;

    /// The parent token of `path`, or `None` when `path` is a root.
    fn parent_of(&self, path: &Path) -> Option<PathBuf> {
        path.parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
    }

    /// The last component of `path` as a display name.
    fn item_name(&self, path: &Path) -> String {
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Append `name` to the `parent` token.
    fn join(&self, parent: &Path, name: &str) -> PathBuf {
        parent.join(name)
    }
}
