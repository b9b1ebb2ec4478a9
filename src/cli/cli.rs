use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::application::data::LogLevel;

/// Snapshot directory disk usage and report where space grew.
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
    #[clap(long, short, default_value = "warn", value_enum, global = true)]
    pub log_level: LogLevel,

    /// Settings file, `dusnap.yaml` in the working directory if present
    #[clap(long, short, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Write a snapshot of the disk usage below a directory
    #[command(alias = "s")]
    Stat {
        dir: PathBuf,
        /// Number of levels below the directory kept in the snapshot
        #[clap(long, short)]
        depth: Option<usize>,
        /// Directory the snapshot file is written to
        #[clap(long, short)]
        output_dir: Option<PathBuf>,
    },
    /// Report growth between an older and a newer snapshot
    #[command(alias = "d")]
    Diff { older: PathBuf, newer: PathBuf },
}
