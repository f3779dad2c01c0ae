//! [`FileTree`]: mapping from root name to root directory (spec §3, §4.2).

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use crate::error::{ErrorKind, FsError, FsResult};
use crate::path::Name;

use super::directory::Directory;
use super::file::{File, FileKind};

/// Unix carries exactly one root (`/`); Windows carries one per configured
/// drive letter or UNC share.
pub struct FileTree {
    roots: Mutex<HashMap<String, Arc<File>>>,
}

impl FileTree {
    pub fn new() -> FileTree {
        FileTree { roots: Mutex::new(HashMap::new()) }
    }

    /// Creates and registers a fresh root directory, whose `..` points to
    /// itself.
    pub fn create_root(&self, root_name: &str) -> Arc<File> {
        let root = File::new_directory(Weak::new());
        root.with_directory_mut(|dir| dir.set_parent(Arc::downgrade(&root)))
            .expect("just constructed as a directory");
        self.roots.lock().unwrap().insert(root_name.to_owned(), root.clone());
        root
    }

    pub fn root(&self, name: &str) -> Option<Arc<File>> {
        self.roots.lock().unwrap().get(name).cloned()
    }

    pub fn root_names(&self) -> Vec<String> {
        self.roots.lock().unwrap().keys().cloned().collect()
    }

    /// Links `child` into `parent` under `name`, updating both files' link
    /// counts: the new entry counts once against `child`, and if `child`
    /// is itself a directory its new `..` back-edge counts once more
    /// against `parent`.
    pub fn link(&self, parent: &Arc<File>, name: Name, child: Arc<File>) -> FsResult<()> {
        let is_dir = child.is_directory();
        parent
            .with_directory_mut(|dir| dir.link(name, child.clone()))
            .ok_or_else(|| FsError::new(ErrorKind::NotDirectory))??;
        child.increment_link_count();
        if is_dir {
            child
                .with_directory_mut(|dir| dir.set_parent(Arc::downgrade(parent)))
                .expect("checked is_directory above");
            parent.increment_link_count();
        }
        Ok(())
    }

    /// Removes the entry `name` from `parent`, decrementing link counts the
    /// mirror image of [`FileTree::link`]. Returns the unlinked file so the
    /// caller can decide whether to free its storage (`link_count == 0`).
    pub fn unlink(&self, parent: &Arc<File>, name: &Name) -> FsResult<Arc<File>> {
        let child = parent
            .with_directory_mut(|dir| dir.unlink(name))
            .ok_or_else(|| FsError::new(ErrorKind::NotDirectory))??;
        child.decrement_link_count();
        if child.is_directory() {
            parent.decrement_link_count();
        }
        Ok(child)
    }
}

impl Default for FileTree {
    fn default() -> Self {
        Self::new()
    }
}

impl File {
    /// A directory's link count starts at 1 for its own `.` self-entry.
    pub fn new_directory(parent: Weak<File>) -> Arc<File> {
        let file = File::new(FileKind::Directory(Directory::new(parent)));
        file.increment_link_count();
        file
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::PathNormalization;
    use crate::storage::{CacheCapacity, HeapDisk, RegularFile};

    fn name(raw: &str) -> Name {
        Name::create(raw, PathNormalization::none(), PathNormalization::none())
    }

    #[test]
    fn linking_a_subdirectory_bumps_both_link_counts() {
        let tree = FileTree::new();
        let root = tree.create_root("/");
        assert_eq!(root.link_count(), 1);

        let child = File::new_directory(Weak::new());
        tree.link(&root, name("sub"), child.clone()).unwrap();
        assert_eq!(root.link_count(), 2); // self + one child directory's ".."
        assert_eq!(child.link_count(), 2); // self + parent entry

        tree.unlink(&root, &name("sub")).unwrap();
        assert_eq!(root.link_count(), 1);
        assert_eq!(child.link_count(), 1);
    }

    #[test]
    fn linking_a_regular_file_only_bumps_its_own_count() {
        let tree = FileTree::new();
        let root = tree.create_root("/");
        let disk = Arc::new(HeapDisk::new(4, 1024, CacheCapacity::Unbounded));
        let leaf = File::new(FileKind::RegularFile(Arc::new(RegularFile::new(disk))));
        tree.link(&root, name("foo"), leaf.clone()).unwrap();
        assert_eq!(leaf.link_count(), 1);
        assert_eq!(root.link_count(), 1);
    }
}
