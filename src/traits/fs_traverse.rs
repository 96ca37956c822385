//! One-level directory traversal with caller-supplied callbacks.

use std::path::Path;

use crate::{FileEntry, FolderEntry, FsError, SymlinkEntry};

/// What to do with a symlink discovered during traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkAction {
    /// Resolve the link target and report it as a file or folder (with the
    /// link's own metadata attached).
    Follow,
    /// Report nothing further; the symlink notification itself was the
    /// whole report.
    Skip,
}

/// Receiver for the entries of exactly one directory level.
///
/// A sink instance is driven for one level only; when
/// [`on_folder`](Self::on_folder) returns a nested sink, the traverser
/// descends into that sub-directory with the fresh instance. Returning
/// `Ok(None)` means "do not recurse into this directory" — it is not an
/// error.
///
/// # Error recovery
///
/// The two error hooks let a sink recover at two granularities:
///
/// - [`on_folder_error`](Self::on_folder_error): a directory could not be
///   opened or its listing failed midway. Returning `Ok(())` asks the
///   traverser to restart that directory's enumeration from the top (a
///   partially-consumed native listing is never resumed — that is not
///   reliable); entries already reported may therefore be reported again.
///   Returning `Err` aborts the whole traversal. The sink owns any retry
///   bound.
/// - [`on_item_error`](Self::on_item_error): metadata for a single entry
///   could not be fetched. Returning `Ok(())` skips just that item;
///   returning `Err` aborts.
pub trait TraversalSink {
    /// A file (or any non-directory, non-link node — fifos and sockets are
    /// deliberately not filtered out).
    fn on_file(&mut self, item: &FileEntry) -> Result<(), FsError>;

    /// A sub-directory. Return a fresh sink to recurse into it, or `None`
    /// to stay flat.
    fn on_folder(&mut self, item: &FolderEntry)
    -> Result<Option<Box<dyn TraversalSink>>, FsError>;

    /// A symlink, link-unresolved. The returned [`LinkAction`] decides
    /// whether the traverser resolves the target.
    fn on_symlink(&mut self, item: &SymlinkEntry) -> Result<LinkAction, FsError>;

    /// Directory-level failure. `Ok(())` = restart this directory's
    /// enumeration, `Err` = abort the traversal.
    fn on_folder_error(&mut self, path: &Path, error: FsError) -> Result<(), FsError>;

    /// Per-item failure. `Ok(())` = skip this item, `Err` = abort the
    /// traversal.
    fn on_item_error(&mut self, path: &Path, error: FsError) -> Result<(), FsError>;
}

/// Directory traversal for a filesystem backend.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync`. Methods use `&self`.
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn FsTraverse`.
pub trait FsTraverse: Send + Sync {
    /// Enumerate the directory at `path`, reporting entries through `sink`
    /// and descending wherever the sink hands out nested sinks.
    ///
    /// Implementations must bound their stack usage independently of tree
    /// depth (an explicit worklist, not call-stack recursion), so that tens
    /// of thousands of nested directories cannot overflow the stack from
    /// traversal bookkeeping alone.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if `path` does not exist and the sink's
    ///   directory-error hook declines to recover
    /// - any error an error hook chooses to abort with
    fn traverse_folder(&self, path: &Path, sink: &mut dyn TraversalSink) -> Result<(), FsError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fs_traverse_is_object_safe() {
        fn _check(_: &dyn FsTraverse) {}
    }

    #[test]
    fn sink_is_object_safe() {
        fn _check(_: &mut dyn TraversalSink) {}
    }

    #[test]
    fn link_action_equality() {
        assert_eq!(LinkAction::Follow, LinkAction::Follow);
        assert_ne!(LinkAction::Follow, LinkAction::Skip);
    }
}
