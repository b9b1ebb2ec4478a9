use std::fs::{self, Metadata};
use std::path::Path;

use derive_more::Display;
use tracing::warn;

use crate::ext::BestEffortPathExt;

/// Size of one allocation unit as reported by `st_blocks`.
pub const BLOCK_SIZE: u64 = 512;

/// Classification of a filesystem entry, obtained without following links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum FileType {
    #[default]
    #[display("unknown")]
    Unknown,
    #[display("regular")]
    Regular,
    #[display("directory")]
    Directory,
    #[display("link")]
    Link,
}

impl FileType {
    /// Integer code used in snapshot documents.
    pub fn code(self) -> u8 {
        match self {
            FileType::Unknown => 0,
            FileType::Regular => 1,
            FileType::Directory => 2,
            FileType::Link => 3,
        }
    }

    pub fn from_code(code: u64) -> Self {
        match code {
            1 => FileType::Regular,
            2 => FileType::Directory,
            3 => FileType::Link,
            _ => FileType::Unknown,
        }
    }
}

/// Result of a link-aware stat of a single entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probe {
    pub file_type: FileType,
    pub size: u64,
}

impl Probe {
    pub fn unknown() -> Self {
        Self {
            file_type: FileType::Unknown,
            size: 0,
        }
    }

    /// Stats `path` without following symbolic links.
    ///
    /// Failures are logged and reported as [`FileType::Unknown`], as are
    /// entries that are neither directories, regular files nor links.
    pub fn of(path: &Path) -> Self {
        let metadata = match fs::symlink_metadata(path) {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!("lstat({}) failed: {e}", path.best_effort_path_display());
                return Self::unknown();
            }
        };

        let kind = metadata.file_type();
        let file_type = if kind.is_dir() {
            FileType::Directory
        } else if kind.is_file() {
            FileType::Regular
        } else if kind.is_symlink() {
            FileType::Link
        } else {
            return Self::unknown();
        };

        Self {
            file_type,
            size: allocated_size(&metadata),
        }
    }
}

#[cfg(unix)]
fn allocated_size(metadata: &Metadata) -> u64 {
    use std::os::unix::fs::MetadataExt;
    metadata.blocks() * BLOCK_SIZE
}

// No block count outside unix, round the logical length up to whole blocks.
#[cfg(not(unix))]
fn allocated_size(metadata: &Metadata) -> u64 {
    metadata.len().div_ceil(BLOCK_SIZE) * BLOCK_SIZE
}
