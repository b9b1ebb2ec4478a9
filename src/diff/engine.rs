use std::cmp::Ordering;

use crate::filesystem::FileNode;

/// One line of a growth report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub path: String,
    pub kind: ChangeKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// Only present in the newer tree.
    New { size: u64 },
    /// Only present in the older tree.
    Deleted { size: u64 },
    /// Present in both, newer is larger by `delta`.
    Grown { delta: u64 },
}

impl Change {
    fn new(path: &str, kind: ChangeKind) -> Self {
        Self {
            path: path.to_owned(),
            kind,
        }
    }
}

/// Compares `newer` against `older`, which must describe the same path at an
/// earlier time, and returns where space grew.
///
/// Only growth is reported: a pair whose size did not increase produces
/// nothing, not even for its children. Changes of children come before the
/// record of their parent. A parent record is left out when a single child
/// accounts for the whole growth.
pub fn diff(newer: &FileNode, older: &FileNode) -> Vec<Change> {
    let mut changes = Vec::new();
    diff_into(newer, older, &mut changes);
    changes
}

fn diff_into(newer: &FileNode, older: &FileNode, changes: &mut Vec<Change>) {
    if newer.size <= older.size {
        return;
    }
    let total_growth = newer.size - older.size;

    if !(newer.is_dir() && older.is_dir()) {
        changes.push(Change::new(&newer.path, ChangeKind::Grown { delta: total_growth }));
        return;
    }

    let mut tally = Tally::default();
    let (mut i, mut j) = (0, 0);
    while i < newer.children.len() && j < older.children.len() {
        let (left, right) = (&newer.children[i], &older.children[j]);
        match left.path.cmp(&right.path) {
            Ordering::Equal => {
                diff_into(left, right, changes);
                if left.size != right.size {
                    tally.count += 1;
                }
                if left.size > right.size {
                    tally.last_growth = left.size - right.size;
                }
                i += 1;
                j += 1;
            }
            Ordering::Less => {
                tally.appeared(left, changes);
                i += 1;
            }
            Ordering::Greater => {
                changes.push(Change::new(&right.path, ChangeKind::Deleted { size: right.size }));
                if right.size > 0 {
                    tally.count += 1;
                }
                j += 1;
            }
        }
    }
    // Children left over in `older` are not reported.
    for left in &newer.children[i..] {
        tally.appeared(left, changes);
    }

    if tally.count != 1 || tally.last_growth != total_growth {
        changes.push(Change::new(&newer.path, ChangeKind::Grown { delta: total_growth }));
    }
}

/// Per-directory bookkeeping for attributing growth to a single child.
#[derive(Debug, Default)]
struct Tally {
    count: usize,
    last_growth: u64,
}

impl Tally {
    fn appeared(&mut self, node: &FileNode, changes: &mut Vec<Change>) {
        changes.push(Change::new(&node.path, ChangeKind::New { size: node.size }));
        if node.size > 0 {
            self.count += 1;
            self.last_growth = node.size;
        }
    }
}
