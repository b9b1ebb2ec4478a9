use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use snafu::{ResultExt, Snafu};
use tracing::debug;

use crate::ext::BestEffortPathExt;
use crate::filesystem::FileNode;
use crate::snapshot::{SnapshotError, deserialize, serialize};

const SNAPSHOT_PREFIX: &str = "dirs_";
const SNAPSHOT_EXTENSION: &str = ".json";
const TIMESTAMP_FORMAT: &str = "%Y.%m.%d-%H.%M.%S.%6f";

/// Derives the snapshot file name from the scanned root and capture time,
/// e.g. `dirs__home_user2024.03.01-10.15.42.123456.json` for `/home/user`.
///
/// `root` is the root node's path, which `stat` has already made absolute,
/// so `stat .` run from `/home/user` is named after `/home/user` rather
/// than after the raw `.` argument.
pub fn snapshot_file_name(root: &str, captured_at: &DateTime<Local>) -> String {
    format!(
        "{SNAPSHOT_PREFIX}{}{}{SNAPSHOT_EXTENSION}",
        root.replace('/', "_"),
        captured_at.format(TIMESTAMP_FORMAT)
    )
}

/// Writes `node` into a freshly named snapshot file under `output_dir`.
pub fn write_snapshot(node: &FileNode, output_dir: &Path) -> Result<PathBuf, StoreError> {
    let path = output_dir.join(snapshot_file_name(&node.path, &Local::now()));
    debug!("Writing snapshot to {}", path.best_effort_path_display());

    let file = File::create(&path).context(CreateSnafu {
        file_path: path.best_effort_path_display(),
    })?;
    let mut writer = BufWriter::new(file);
    serialize(node, &mut writer).context(EncodeSnafu {
        file_path: path.best_effort_path_display(),
    })?;
    writer.flush().context(WriteSnafu {
        file_path: path.best_effort_path_display(),
    })?;

    Ok(path)
}

pub fn read_snapshot(path: &Path) -> Result<FileNode, StoreError> {
    debug!("Reading snapshot from {}", path.best_effort_path_display());
    let file = File::open(path).context(OpenSnafu {
        file_path: path.best_effort_path_display(),
    })?;
    deserialize(BufReader::new(file)).context(DecodeSnafu {
        file_path: path.best_effort_path_display(),
    })
}

#[derive(Debug, Snafu)]
pub enum StoreError {
    #[snafu(display("Cannot create snapshot file {}", file_path))]
    CreateError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Failed to write snapshot file {}", file_path))]
    WriteError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Failed to encode snapshot into {}", file_path))]
    EncodeError {
        file_path: String,
        source: SnapshotError,
    },
    #[snafu(display("Cannot open snapshot file {}", file_path))]
    OpenError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Failed to load snapshot from {}", file_path))]
    DecodeError {
        file_path: String,
        source: SnapshotError,
    },
}
