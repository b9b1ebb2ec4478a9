//! Persisted snapshots of a [`FileNode`](crate::filesystem::FileNode) tree.
//!
//! A snapshot is a pretty-printed JSON document, one object per node:
//! `path`, `size`, `type` and, only for nodes with retained children, `subs`.

mod codec;
mod store;

pub use codec::{SnapshotError, deserialize, serialize};
pub use store::{StoreError, read_snapshot, write_snapshot};
