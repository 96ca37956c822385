//! Core types for the crossfs filesystem abstraction.

/// Discriminant identifying a concrete backend implementation.
///
/// The same-backend fast path in [`copy_file`](crate::copy_file) matches on
/// this discriminant, never on open-ended runtime type comparison: two
/// different backend implementations are never assumed compatible just
/// because both are, say, "remote". The set is closed on purpose so the
/// valid "same backend" pairings stay explicit and exhaustively checkable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BackendKind {
    /// Local OS filesystem ([`NativeBackend`](crate::NativeBackend)).
    Native,
    /// In-memory backend (testing, caching layers).
    Memory,
    /// MTP device.
    Mtp,
    /// SFTP endpoint.
    Sftp,
}

/// Type of a filesystem entry, link-unresolved.
///
/// A symlink reports [`Symlink`](ItemKind::Symlink) regardless of what it
/// points at; resolving the target is a separate, explicit step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ItemKind {
    /// Regular file (or any non-directory, non-link node such as a fifo).
    File,
    /// Directory.
    Folder,
    /// Symbolic link.
    Symlink,
}

/// Stable identity of a physical file: volume identifier plus file index.
///
/// Used only as a *hint* to detect that a path still refers to the same
/// physical file across operations. Not all backends can supply one, so the
/// all-zero [`UNKNOWN`](FileId::UNKNOWN) value means "unavailable" and
/// callers must never base correctness-critical decisions on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FileId {
    /// Volume (device) identifier.
    pub volume: u64,
    /// File index (inode number) on that volume.
    pub index: u64,
}

impl FileId {
    /// The reserved "identity unavailable" value.
    pub const UNKNOWN: FileId = FileId {
        volume: 0,
        index: 0,
    };

    /// Build an identity from raw volume/index values.
    ///
    /// If either raw value is degenerate (zero), the whole identity is
    /// reported as [`UNKNOWN`](Self::UNKNOWN) rather than a misleading
    /// zero-but-valid pair.
    #[must_use]
    pub fn new(volume: u64, index: u64) -> Self {
        if volume == 0 || index == 0 {
            Self::UNKNOWN
        } else {
            Self { volume, index }
        }
    }

    /// `true` if this is the reserved unavailable value.
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        *self == Self::UNKNOWN
    }
}

/// Result record of a completed file copy.
///
/// Created only as the return value of a copy operation and consumed by the
/// caller to update its own metadata cache. `file_size` and
/// `modification_time` reflect what was read from the *source stream at open
/// time*, not a re-stat after the transfer.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CopyAttributes {
    /// Number of bytes the source reported when its read stream was opened.
    pub file_size: u64,
    /// Source modification time, seconds since the Unix epoch.
    pub modification_time: i64,
    /// Identity of the source file, or [`FileId::UNKNOWN`].
    pub source_file_id: FileId,
    /// Identity of the freshly written target, or [`FileId::UNKNOWN`].
    pub target_file_id: FileId,
}

/// A regular-file entry reported by a traversal.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FileEntry {
    /// Item name (not a full path).
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Modification time, seconds since the Unix epoch.
    pub modified: i64,
    /// Stable identity, or [`FileId::UNKNOWN`].
    pub file_id: FileId,
    /// When the file was reached by following a symlink, the link's own
    /// metadata; `None` for a plain file.
    pub symlink: Option<SymlinkEntry>,
}

/// A sub-directory entry reported by a traversal.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FolderEntry {
    /// Item name (not a full path).
    pub name: String,
    /// When the folder was reached by following a symlink, the link's own
    /// metadata; `None` for a real directory.
    pub symlink: Option<SymlinkEntry>,
}

/// A symbolic-link entry reported by a traversal, link-unresolved.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SymlinkEntry {
    /// Item name (not a full path).
    pub name: String,
    /// Modification time of the link itself, seconds since the Unix epoch.
    pub modified: i64,
}
