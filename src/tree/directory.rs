//! [`Directory`]: the entry table for one directory file (spec §3, §4.2).
//!
//! `.`/`..` are never stored in `entries` — they are synthesized by the
//! lookup engine from the directory's own identity and its cached parent
//! back-reference, matching `examples/shadow_fs/fs/state.rs`'s pattern of
//! keeping a side index rather than self-referential entries.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use crate::error::{FsError, FsResult};
use crate::path::Name;

use super::file::File;

pub struct Directory {
    entries: HashMap<Name, Arc<File>>,
    /// Cached "entry in parent": every non-root directory has exactly one
    /// real parent entry outside its own table. The root's parent is itself.
    parent: Weak<File>,
}

impl Directory {
    pub fn new(parent: Weak<File>) -> Directory {
        Directory { entries: HashMap::new(), parent }
    }

    pub fn get(&self, name: &Name) -> Option<Arc<File>> {
        self.entries.get(name).cloned()
    }

    pub fn parent(&self) -> Arc<File> {
        self.parent.upgrade().expect("directory outlived its parent entry")
    }

    pub fn set_parent(&mut self, parent: Weak<File>) {
        self.parent = parent;
    }

    /// Inserts `name -> target`. Fails if `name` is a reserved sentinel or
    /// already present.
    pub fn link(&mut self, name: Name, target: Arc<File>) -> FsResult<()> {
        if name.is_self() || name.is_parent() {
            return Err(FsError::with_message(
                crate::error::ErrorKind::InvalidArgument,
                format!("cannot link reserved name '{name}'"),
            ));
        }
        if self.entries.contains_key(&name) {
            return Err(FsError::with_path(crate::error::ErrorKind::AlreadyExists, name.display()));
        }
        self.entries.insert(name, target);
        Ok(())
    }

    pub fn unlink(&mut self, name: &Name) -> FsResult<Arc<File>> {
        self.entries
            .remove(name)
            .ok_or_else(|| FsError::with_path(crate::error::ErrorKind::NotFound, name.display()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entry names sorted by display string, excluding `.`/`..`.
    pub fn snapshot(&self) -> Vec<Name> {
        let mut names: Vec<Name> = self.entries.keys().cloned().collect();
        names.sort_by(|a, b| a.display().cmp(b.display()));
        names
    }

    pub fn entries(&self) -> impl Iterator<Item = (&Name, &Arc<File>)> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::PathNormalization;
    use crate::tree::file::FileKind;

    fn name(raw: &str) -> Name {
        Name::create(raw, PathNormalization::none(), PathNormalization::none())
    }

    #[test]
    fn link_rejects_reserved_names_and_duplicates() {
        let root = File::new(FileKind::Directory(Directory::new(Weak::new())));
        root.with_directory_mut(|dir| {
            assert!(dir.link(Name::self_name(), root.clone()).is_err());
            let leaf = File::new(FileKind::RegularFile(Arc::new(crate::storage::RegularFile::new(Arc::new(
                crate::storage::HeapDisk::new(4, 1024, crate::storage::CacheCapacity::Unbounded),
            )))));
            dir.link(name("foo"), leaf.clone()).unwrap();
            assert!(dir.link(name("foo"), leaf).is_err());
        });
    }

    #[test]
    fn snapshot_excludes_dot_entries_and_sorts_by_display() {
        let root = File::new(FileKind::Directory(Directory::new(Weak::new())));
        root.with_directory_mut(|dir| {
            let leaf = || File::new(FileKind::RegularFile(Arc::new(crate::storage::RegularFile::new(Arc::new(
                crate::storage::HeapDisk::new(4, 1024, crate::storage::CacheCapacity::Unbounded),
            )))));
            dir.link(name("b"), leaf()).unwrap();
            dir.link(name("a"), leaf()).unwrap();
            let snap = dir.snapshot();
            assert_eq!(snap.iter().map(|n| n.display().to_owned()).collect::<Vec<_>>(), vec!["a", "b"]);
        });
    }
}
