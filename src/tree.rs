//! Recursive folder creation and removal.

use tracing::debug;

use crate::{
    AfsPath, FileEntry, FolderEntry, FsError, ItemKind, LinkAction, SymlinkEntry, TraversalSink,
};

/// Notification fired right before an item is deleted. Returning `Err`
/// aborts the surrounding removal. The lifetime parameter lets the closure
/// borrow caller-local state for the duration of the call.
pub type NotifyFn<'a> = dyn FnMut(&AfsPath) -> Result<(), FsError> + 'a;

/// One directory level, collected flat.
///
/// Gathers a level's entries into owned lists *before* anything recurses —
/// the non-recursing collector behind [`remove_folder_all`], exposed
/// because plain "list one level" is useful on its own. Symlinks are never
/// followed; they land in [`symlinks`](Self::symlinks) regardless of what
/// they point at.
#[derive(Debug, Default)]
pub struct FolderContents {
    /// Plain files (and other non-directory nodes).
    pub files: Vec<FileEntry>,
    /// Real sub-directories.
    pub folders: Vec<FolderEntry>,
    /// Symlinks, link-unresolved.
    pub symlinks: Vec<SymlinkEntry>,
}

impl FolderContents {
    /// Enumerate exactly one level of `path`.
    ///
    /// # Errors
    ///
    /// Any traversal failure aborts the listing; there is no per-item
    /// recovery here.
    pub fn list(path: &AfsPath) -> Result<Self, FsError> {
        let mut contents = FolderContents::default();
        path.backend()
            .traverse_folder(path.item(), &mut FlatCollector(&mut contents))?;
        Ok(contents)
    }
}

/// Sink adapter that fills a [`FolderContents`] without recursing.
struct FlatCollector<'a>(&'a mut FolderContents);

impl TraversalSink for FlatCollector<'_> {
    fn on_file(&mut self, item: &FileEntry) -> Result<(), FsError> {
        self.0.files.push(item.clone());
        Ok(())
    }

    fn on_folder(
        &mut self,
        item: &FolderEntry,
    ) -> Result<Option<Box<dyn TraversalSink>>, FsError> {
        self.0.folders.push(item.clone());
        Ok(None)
    }

    fn on_symlink(&mut self, item: &SymlinkEntry) -> Result<LinkAction, FsError> {
        self.0.symlinks.push(item.clone());
        Ok(LinkAction::Skip)
    }

    fn on_folder_error(&mut self, _path: &std::path::Path, error: FsError) -> Result<(), FsError> {
        Err(error)
    }

    fn on_item_error(&mut self, _path: &std::path::Path, error: FsError) -> Result<(), FsError> {
        Err(error)
    }
}

/// Create `path` as a folder, creating missing parents on demand.
///
/// Optimistic: the leaf is attempted first, and only a
/// [`ParentMissing`](FsError::ParentMissing) answer walks up one level,
/// creates the parent chain, and retries the leaf once. An
/// [`AlreadyExists`](FsError::AlreadyExists) answer counts as success, so
/// the operation is idempotent and the common "everything but the leaf
/// already exists" case costs a single backend call. Recursion depth is
/// bounded by the path's segment count.
///
/// # Errors
///
/// - the original error when `path` is a root that cannot be created
/// - any backend failure other than the two recovered kinds
pub fn create_folder_all(path: &AfsPath) -> Result<(), FsError> {
    match path.backend().create_folder(path.item()) {
        Ok(()) => Ok(()),
        Err(e) if e.is_already_exists() => Ok(()),
        Err(e) if e.is_parent_missing() => {
            let Some(parent) = path.parent() else {
                // Nothing above to create; the original error stands.
                return Err(e);
            };
            create_folder_all(&parent)?;
            match path.backend().create_folder(path.item()) {
                Ok(()) => Ok(()),
                Err(retry) if retry.is_already_exists() => Ok(()),
                Err(retry) => Err(retry),
            }
        }
        Err(e) => Err(e),
    }
}

/// Remove `path` and everything under it.
///
/// - Missing path: silent no-op (manual deletion in between must not fail).
/// - `path` itself a symlink: one folder notification, then the link is
///   removed as a leaf — removal never descends through a symlink, so
///   files inside the link's target stay untouched.
/// - Real folder: each level is collected flat first
///   ([`FolderContents`]), then per level plain files go first (file
///   notification each), then symlinks as leaves (folder notification for
///   links resolving to a directory, file notification otherwise), then
///   sub-folders are queued on an explicit worklist. Folder deletions run
///   strictly post-order: a directory's own deletion happens after all of
///   its children have been processed, and depth is bounded by memory
///   rather than the call stack.
///
/// # Errors
///
/// - [`FsError::NotADirectory`] if `path` is a plain file
/// - any backend failure, and any error raised by a notification
pub fn remove_folder_all(
    path: &AfsPath,
    mut on_before_file_deletion: Option<&mut NotifyFn<'_>>,
    mut on_before_folder_deletion: Option<&mut NotifyFn<'_>>,
) -> Result<(), FsError> {
    match path.item_type()? {
        None => return Ok(()),
        Some(ItemKind::Symlink) => {
            if let Some(notify) = on_before_folder_deletion.as_mut() {
                notify(path)?;
            }
            return path.backend().remove_symlink(path.item());
        }
        Some(ItemKind::File) => {
            return Err(FsError::NotADirectory {
                path: path.item().to_path_buf(),
            });
        }
        Some(ItemKind::Folder) => {}
    }
    debug!(%path, "removing folder tree");

    let mut to_expand = vec![path.clone()];
    let mut to_delete: Vec<AfsPath> = Vec::new();

    while let Some(dir) = to_expand.pop() {
        let contents = FolderContents::list(&dir)?;

        for file in &contents.files {
            let item = dir.join(&file.name);
            if let Some(notify) = on_before_file_deletion.as_mut() {
                notify(&item)?;
            }
            item.backend().remove_file(item.item())?;
        }

        for link in &contents.symlinks {
            let item = dir.join(&link.name);
            // A directory symlink goes away as a single leaf.
            let points_at_folder =
                item.backend().resolved_item_type(item.item())? == Some(ItemKind::Folder);
            if points_at_folder {
                if let Some(notify) = on_before_folder_deletion.as_mut() {
                    notify(&item)?;
                }
            } else if let Some(notify) = on_before_file_deletion.as_mut() {
                notify(&item)?;
            }
            item.backend().remove_symlink(item.item())?;
        }

        for folder in &contents.folders {
            to_expand.push(dir.join(&folder.name));
        }
        to_delete.push(dir);
    }

    // Expansion visited parents before children, so the reverse order is
    // post-order: every directory is empty by the time its turn comes.
    for dir in to_delete.into_iter().rev() {
        if let Some(notify) = on_before_folder_deletion.as_mut() {
            notify(&dir)?;
        }
        dir.backend().remove_folder(dir.item())?;
    }
    Ok(())
}
