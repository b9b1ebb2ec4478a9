//! In-memory model of a directory tree annotated with disk usage.
//!
//! Sizes are measured in allocated storage blocks rather than logical
//! length, and every directory carries the aggregated size of everything
//! below it even when only the upper levels are retained as nodes.

mod file_type;
mod tree;

pub use file_type::{BLOCK_SIZE, FileType, Probe};
pub use tree::FileNode;
