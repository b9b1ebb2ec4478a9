use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::ext::BestEffortPathExt;
use crate::filesystem::{FileType, Probe};

/// A filesystem entry together with the disk usage of everything below it.
///
/// `children` is always sorted ascending by `path`; the diff relies on it.
/// Children are only retained down to the depth requested at build time,
/// but `size` always covers the whole physical subtree.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileNode {
    pub path: String,
    pub size: u64,
    pub file_type: FileType,
    pub children: Vec<FileNode>,
}

impl FileNode {
    pub fn new(path: impl Into<String>, file_type: FileType, size: u64) -> Self {
        Self {
            path: path.into(),
            size,
            file_type,
            children: Vec::new(),
        }
    }

    /// Attaches `children`, restoring the path ordering.
    pub fn with_children(mut self, children: Vec<FileNode>) -> Self {
        self.children = children;
        self.sort_children();
        self
    }

    pub fn sort_children(&mut self) {
        self.children.sort_by(|a, b| a.path.cmp(&b.path));
    }

    pub fn is_dir(&self) -> bool {
        self.file_type == FileType::Directory
    }

    /// Walks `path` and returns its node.
    ///
    /// Every subdirectory is descended into regardless of `retention_depth`
    /// so sizes are exact; the depth only decides how many levels of
    /// children are kept. Entries that cannot be classified are dropped and
    /// contribute nothing.
    pub fn build(path: &Path, retention_depth: usize) -> Self {
        let probe = Probe::of(path);
        let mut node = Self::new(
            path.to_string_lossy().into_owned(),
            probe.file_type,
            probe.size,
        );
        if node.is_dir() {
            node.walk(path, retention_depth);
        }
        node
    }

    fn walk(&mut self, dir: &Path, retention_depth: usize) {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("could not open dir {}: {e}", dir.best_effort_path_display());
                return;
            }
        };

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("failed to read entry in {}: {e}", dir.best_effort_path_display());
                    continue;
                }
            };

            let name = entry.file_name();
            if name.to_str().is_none() {
                warn!(
                    "entry name in {} is not valid UTF-8, its recorded path may collide with a sibling",
                    dir.best_effort_path_display()
                );
            }

            let child = Self::build(&dir.join(name), retention_depth.saturating_sub(1));
            if child.file_type == FileType::Unknown {
                debug!("Skipping {} entry {}", child.file_type, child.path);
                continue;
            }
            self.size += child.size;
            if retention_depth > 0 {
                self.children.push(child);
            }
        }

        self.sort_children();
    }

    /// Number of retained nodes, this one included.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(FileNode::node_count).sum::<usize>()
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::filesystem::BLOCK_SIZE;
    use rstest::*;
    use std::os::unix::fs::MetadataExt;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// root/{b.txt, a/{one.bin, deep/{deeper/{two.bin}}}, c/}
    fn fixture() -> TempDir {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        fs::write(root.join("b.txt"), "x".repeat(3000)).expect("Failed to write b.txt");
        fs::create_dir_all(root.join("a/deep/deeper")).expect("Failed to create dirs");
        fs::write(root.join("a/one.bin"), vec![1u8; 20_000]).expect("Failed to write one.bin");
        fs::write(root.join("a/deep/deeper/two.bin"), vec![2u8; 70_000])
            .expect("Failed to write two.bin");
        fs::create_dir(root.join("c")).expect("Failed to create c");
        temp_dir
    }

    fn disk_usage(path: &Path) -> u64 {
        let metadata = fs::symlink_metadata(path).expect("Failed to stat fixture entry");
        let mut total = metadata.blocks() * BLOCK_SIZE;
        if metadata.is_dir() {
            for entry in fs::read_dir(path).expect("Failed to list fixture dir") {
                total += disk_usage(&entry.expect("Failed to read entry").path());
            }
        }
        total
    }

    fn find<'a>(node: &'a FileNode, path: &str) -> Option<&'a FileNode> {
        if node.path == path {
            return Some(node);
        }
        node.children.iter().find_map(|child| find(child, path))
    }

    fn assert_sizes_aggregate(node: &FileNode) {
        if node.is_dir() {
            assert_eq!(node.size, disk_usage(Path::new(&node.path)), "{}", node.path);
        }
        node.children.iter().for_each(assert_sizes_aggregate);
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(2)]
    #[case(5)]
    fn test_directory_size_is_exact_for_any_depth(#[case] depth: usize) {
        let temp_dir = fixture();

        let node = FileNode::build(temp_dir.path(), depth);

        assert_eq!(node.file_type, FileType::Directory);
        assert_eq!(node.size, disk_usage(temp_dir.path()));
        assert_sizes_aggregate(&node);
    }

    #[test]
    fn test_depth_zero_keeps_no_children() {
        let temp_dir = fixture();

        let node = FileNode::build(temp_dir.path(), 0);

        assert!(node.children.is_empty());
        assert_eq!(node.size, FileNode::build(temp_dir.path(), 10).size);
    }

    #[test]
    fn test_depth_limits_retained_levels() {
        let temp_dir = fixture();

        let node = FileNode::build(temp_dir.path(), 1);

        assert_eq!(node.children.len(), 3);
        let a = &node.children[0];
        assert_eq!(a.path, temp_dir.path().join("a").to_string_lossy());
        assert!(a.children.is_empty());
        assert_eq!(a.size, disk_usage(&temp_dir.path().join("a")));
    }

    #[test]
    fn test_children_sorted_by_path() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        for name in ["zeta", "alpha", "Mid", "beta"] {
            fs::write(temp_dir.path().join(name), name).expect("Failed to write file");
        }

        let node = FileNode::build(temp_dir.path(), 1);

        let paths: Vec<&str> = node.children.iter().map(|c| c.path.as_str()).collect();
        let mut sorted = paths.clone();
        sorted.sort();
        assert_eq!(paths, sorted);
        assert!(paths[0].ends_with("Mid"));
    }

    #[test]
    fn test_trailing_separator_is_not_doubled() {
        let temp_dir = fixture();
        let with_slash = PathBuf::from(format!("{}/", temp_dir.path().display()));

        let node = FileNode::build(&with_slash, 1);

        assert!(node.children.iter().all(|c| !c.path.contains("//")));
    }

    #[test]
    fn test_links_are_not_followed() {
        let temp_dir = fixture();
        let link = temp_dir.path().join("link");
        std::os::unix::fs::symlink(temp_dir.path().join("a"), &link)
            .expect("Failed to create symlink");

        let node = FileNode::build(temp_dir.path(), 2);

        let link_node = find(&node, &link.to_string_lossy()).expect("link should be retained");
        assert_eq!(link_node.file_type, FileType::Link);
        assert!(link_node.children.is_empty());
        assert_eq!(node.size, disk_usage(temp_dir.path()));
    }

    #[rstest]
    #[case(0)]
    #[case(2)]
    fn test_unclassified_entries_are_excluded(#[case] depth: usize) {
        let temp_dir = fixture();
        let socket = temp_dir.path().join("a/control.sock");
        let _listener =
            std::os::unix::net::UnixListener::bind(&socket).expect("Failed to bind socket");
        let socket_size = disk_usage(&socket);

        let node = FileNode::build(temp_dir.path(), depth);

        let socket_path = socket.to_string_lossy();
        assert!(find(&node, &socket_path).is_none());
        assert_eq!(node.size, disk_usage(temp_dir.path()) - socket_size);
        if depth > 0 {
            let a = find(&node, &temp_dir.path().join("a").to_string_lossy())
                .expect("a should be retained");
            assert!(a.children.iter().all(|c| c.path != socket_path));
            assert_eq!(a.size, disk_usage(&temp_dir.path().join("a")) - socket_size);
        } else {
            assert!(node.children.is_empty());
        }
    }

    #[test]
    fn test_unlistable_directory_keeps_its_own_size() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = fixture();
        let locked = temp_dir.path().join("a/deep");
        let locked_size = fs::symlink_metadata(&locked)
            .expect("Failed to stat locked dir")
            .blocks()
            * BLOCK_SIZE;
        let below_locked = disk_usage(&locked) - locked_size;
        let full_total = disk_usage(temp_dir.path());
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000))
            .expect("Failed to lock dir");
        if fs::read_dir(&locked).is_ok() {
            // Permissions are not enforced, e.g. when running as root.
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755))
                .expect("Failed to unlock dir");
            return;
        }

        let node = FileNode::build(temp_dir.path(), 5);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755))
            .expect("Failed to unlock dir");

        let deep = find(&node, &locked.to_string_lossy()).expect("deep should be retained");
        assert_eq!(deep.file_type, FileType::Directory);
        assert!(deep.children.is_empty());
        assert_eq!(deep.size, locked_size);
        assert_eq!(node.size, full_total - below_locked);
        let b = find(&node, &temp_dir.path().join("b.txt").to_string_lossy())
            .expect("b.txt should be retained");
        assert_eq!(b.size, disk_usage(&temp_dir.path().join("b.txt")));
        let one = find(&node, &temp_dir.path().join("a/one.bin").to_string_lossy())
            .expect("one.bin should be retained");
        assert_eq!(one.size, disk_usage(&temp_dir.path().join("a/one.bin")));
    }

    #[test]
    fn test_non_utf8_names_are_kept_with_lossy_paths() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let name = OsStr::from_bytes(b"bad\xffname");
        if fs::write(temp_dir.path().join(name), "data").is_err() {
            // Filesystem rejects names that are not UTF-8.
            return;
        }

        let node = FileNode::build(temp_dir.path(), 1);

        assert_eq!(node.children.len(), 1);
        assert!(node.children[0].path.ends_with("bad\u{FFFD}name"));
        assert_eq!(node.size, disk_usage(temp_dir.path()));
    }

    #[test]
    fn test_build_nonexistent_path() {
        let node = FileNode::build(Path::new("/this/path/does/not/exist"), 5);

        assert_eq!(node.file_type, FileType::Unknown);
        assert_eq!(node.size, 0);
        assert!(node.children.is_empty());
    }

    #[test]
    fn test_build_regular_file() {
        let temp_dir = fixture();

        let node = FileNode::build(&temp_dir.path().join("b.txt"), 5);

        assert_eq!(node.file_type, FileType::Regular);
        assert!(node.children.is_empty());
    }

    #[test]
    fn test_node_count_covers_retained_levels() {
        let temp_dir = fixture();

        let node = FileNode::build(temp_dir.path(), 5);

        // root, b.txt, a, one.bin, deep, deeper, two.bin, c
        assert_eq!(node.node_count(), 8);
        let two = temp_dir.path().join("a/deep/deeper/two.bin");
        assert!(find(&node, &two.to_string_lossy()).is_some());
        assert!(find(&node, "/nowhere").is_none());
    }

    #[test]
    fn test_with_children_sorts() {
        let node = FileNode::new("/r", FileType::Directory, 0).with_children(vec![
            FileNode::new("/r/b", FileType::Regular, 1),
            FileNode::new("/r/a", FileType::Regular, 1),
        ]);

        assert_eq!(node.children[0].path, "/r/a");
        assert_eq!(node.children[1].path, "/r/b");
    }
}
