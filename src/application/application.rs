use std::io;
use std::path::{Path, PathBuf};

use snafu::Snafu;
use snafu::prelude::*;
use tracing::{debug, info};

use crate::application::RuntimeConfig;
use crate::cli::Cli;
use crate::config::{Settings, SettingsError};
use crate::diff::{Change, Report, diff};
use crate::ext::BestEffortPathExt;
use crate::filesystem::{FileNode, FileType};
use crate::snapshot::{StoreError, read_snapshot, write_snapshot};

pub struct Application;

impl Application {
    pub fn run(cli: Cli) -> Result<(), ApplicationError> {
        let settings = Settings::read(cli.config.as_deref()).context(SettingsSnafu)?;
        debug!("Loaded settings: {:?}", settings);

        match RuntimeConfig::resolve(cli.command, settings) {
            RuntimeConfig::Stat {
                root,
                retention_depth,
                output_dir,
            } => {
                let path = Self::stat(&root, retention_depth, &output_dir)?;
                println!("{}", path.display());
            }
            RuntimeConfig::Diff { older, newer } => {
                let changes = Self::compare(&older, &newer)?;
                Report::for_stdout()
                    .write_all(&changes, io::stdout().lock())
                    .context(ReportSnafu)?;
            }
        }

        Ok(())
    }

    /// Walks `root` and writes its snapshot into `output_dir`.
    pub fn stat(
        root: &Path,
        retention_depth: usize,
        output_dir: &Path,
    ) -> Result<PathBuf, ApplicationError> {
        let root = std::path::absolute(root).context(ResolveRootSnafu {
            path: root.best_effort_path_display(),
        })?;
        info!("Scanning {} with retention depth {retention_depth}", root.display());

        let tree = FileNode::build(&root, retention_depth);
        if tree.file_type == FileType::Unknown {
            return UnreadableRootSnafu {
                path: root.best_effort_path_display(),
            }
            .fail();
        }
        debug!("Scanned {} nodes, {} bytes in total", tree.node_count(), tree.size);

        let path = write_snapshot(&tree, output_dir).context(StoreSnafu)?;
        info!("Wrote snapshot {}", path.best_effort_path_display());
        Ok(path)
    }

    /// Loads both snapshots and returns where the newer one grew.
    pub fn compare(older: &Path, newer: &Path) -> Result<Vec<Change>, ApplicationError> {
        info!("loading {}", older.best_effort_path_display());
        let older_tree = read_snapshot(older).context(StoreSnafu)?;
        info!("loading {}", newer.best_effort_path_display());
        let newer_tree = read_snapshot(newer).context(StoreSnafu)?;

        info!(
            "comparing {} {}",
            older.best_effort_path_display(),
            newer.best_effort_path_display()
        );
        Ok(diff(&newer_tree, &older_tree))
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Critical failure encountered while loading settings"))]
    SettingsError { source: SettingsError },
    #[snafu(display("Cannot resolve directory {}", path))]
    ResolveRootError { path: String, source: io::Error },
    #[snafu(display("Cannot stat directory {}", path))]
    UnreadableRootError { path: String },
    #[snafu(display("Critical failure encountered while accessing a snapshot"))]
    StoreError { source: StoreError },
    #[snafu(display("Failed to write the report"))]
    ReportError { source: io::Error },
}
