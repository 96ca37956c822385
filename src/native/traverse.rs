//! Directory traversal for the native backend.
//!
//! One directory level is enumerated at a time; sub-folders the sink asks
//! to descend into are queued on an explicit worklist, so traversal depth
//! is bounded by memory, not the call stack. `std::fs::read_dir` already
//! omits the `.` and `..` entries.

use std::fs;
use std::path::{Path, PathBuf};

use crate::{
    FileEntry, FolderEntry, FsError, FsTraverse, LinkAction, SymlinkEntry, TraversalSink,
};

use super::{NativeBackend, file_id_of, io_error, mtime_of};

impl FsTraverse for NativeBackend {
    fn traverse_folder(&self, path: &Path, sink: &mut dyn TraversalSink) -> Result<(), FsError> {
        let mut pending: Vec<(PathBuf, Box<dyn TraversalSink>)> = Vec::new();
        traverse_level(path, sink, &mut pending)?;

        while let Some((dir, mut child_sink)) = pending.pop() {
            let mut descend = Vec::new();
            traverse_level(&dir, child_sink.as_mut(), &mut descend)?;
            pending.append(&mut descend);
        }
        Ok(())
    }
}

/// Enumerate one directory level, reporting each entry to `sink` and
/// collecting the sub-folders the sink wants descended into.
///
/// A directory-level failure (opening the listing, or a fault while
/// iterating it) goes to `on_folder_error`; if the sink answers `Ok` the
/// whole level restarts from scratch, since a partially consumed listing
/// cannot be resumed reliably. Per-item failures go to `on_item_error`,
/// where `Ok` skips just that entry.
fn traverse_level(
    dir: &Path,
    sink: &mut dyn TraversalSink,
    children: &mut Vec<(PathBuf, Box<dyn TraversalSink>)>,
) -> Result<(), FsError> {
    'restart: loop {
        children.clear();

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                sink.on_folder_error(dir, io_error("read_dir", dir, e))?;
                continue 'restart;
            }
        };

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    sink.on_folder_error(dir, io_error("read_dir", dir, e))?;
                    continue 'restart;
                }
            };
            let item_path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();

            let meta = match fs::symlink_metadata(&item_path) {
                Ok(meta) => meta,
                Err(e) => {
                    sink.on_item_error(&item_path, io_error("symlink_metadata", &item_path, e))?;
                    continue;
                }
            };

            if meta.is_symlink() {
                let link = SymlinkEntry {
                    name: name.clone(),
                    modified: mtime_of(&meta),
                };
                match sink.on_symlink(&link)? {
                    LinkAction::Skip => {}
                    LinkAction::Follow => {
                        // Second lookup, this time through the link. A broken
                        // link surfaces here as a per-item error.
                        let resolved = match fs::metadata(&item_path) {
                            Ok(meta) => meta,
                            Err(e) => {
                                sink.on_item_error(
                                    &item_path,
                                    io_error("metadata", &item_path, e),
                                )?;
                                continue;
                            }
                        };
                        if resolved.is_dir() {
                            let folder = FolderEntry {
                                name,
                                symlink: Some(link),
                            };
                            if let Some(child) = sink.on_folder(&folder)? {
                                children.push((item_path, child));
                            }
                        } else {
                            sink.on_file(&FileEntry {
                                name,
                                size: resolved.len(),
                                modified: mtime_of(&resolved),
                                file_id: file_id_of(&resolved),
                                symlink: Some(link),
                            })?;
                        }
                    }
                }
            } else if meta.is_dir() {
                let folder = FolderEntry {
                    name,
                    symlink: None,
                };
                if let Some(child) = sink.on_folder(&folder)? {
                    children.push((item_path, child));
                }
            } else {
                // Fifos, sockets, device nodes all count as files here.
                sink.on_file(&FileEntry {
                    name,
                    size: meta.len(),
                    modified: mtime_of(&meta),
                    file_id: file_id_of(&meta),
                    symlink: None,
                })?;
            }
        }
        return Ok(());
    }
}
