//! Growth report between two snapshots of the same directory.

mod engine;
mod report;

pub use engine::{Change, ChangeKind, diff};
pub use report::Report;
