use std::path::PathBuf;

use crate::cli::Command;
use crate::config::Settings;

/// A command with every default resolved.
///
/// Command line flags win over the settings file, which wins over the
/// built-in defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeConfig {
    Stat {
        root: PathBuf,
        retention_depth: usize,
        output_dir: PathBuf,
    },
    Diff {
        older: PathBuf,
        newer: PathBuf,
    },
}

impl RuntimeConfig {
    pub fn resolve(command: Command, settings: Settings) -> Self {
        match command {
            Command::Stat {
                dir,
                depth,
                output_dir,
            } => RuntimeConfig::Stat {
                root: dir,
                retention_depth: depth.unwrap_or(settings.retention_depth),
                output_dir: output_dir.unwrap_or(settings.output_dir),
            },
            Command::Diff { older, newer } => RuntimeConfig::Diff { older, newer },
        }
    }
}
