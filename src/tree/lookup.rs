//! The lookup engine (spec §4.2): resolves a [`JimfsPath`] against a
//! working directory, following symbolic links and `.`/`..` and detecting
//! traversal loops.

use std::sync::Arc;

use crate::error::{loop_error, not_found, FsResult};
use crate::path::{JimfsPath, Name};

use super::file::File;
use super::file_tree::FileTree;

/// Caps total symbolic-link traversals per top-level lookup call, per
/// spec §4.2 ("Limit total symlink traversals to a constant (10)").
const MAX_SYMLINK_TRAVERSALS: u32 = 10;

/// Mirrors `java.nio.file.LinkOption`: the only option this library's
/// lookup algorithm consults is whether to follow a symlink that is the
/// path's final component.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkOptions {
    pub nofollow_links: bool,
}

/// The result of a lookup: either a concrete hit (`file.is_some()`) or a
/// "parent only" match when every component but the last resolved and the
/// last is simply absent from `directory`.
#[derive(Debug)]
pub struct DirectoryEntry {
    pub directory: Arc<File>,
    pub name: Option<Name>,
    pub file: Option<Arc<File>>,
}

impl DirectoryEntry {
    pub fn exists(&self) -> bool {
        self.file.is_some()
    }
}

pub fn look_up(
    tree: &FileTree,
    work_dir: &Arc<File>,
    path: &JimfsPath,
    options: LinkOptions,
) -> FsResult<DirectoryEntry> {
    let mut traversals = 0u32;
    look_up_inner(tree, work_dir, path, options, &mut traversals)
}

fn look_up_inner(
    tree: &FileTree,
    work_dir: &Arc<File>,
    path: &JimfsPath,
    options: LinkOptions,
    traversals: &mut u32,
) -> FsResult<DirectoryEntry> {
    let mut current = match path.root() {
        Some(root) => tree.root(root).ok_or_else(|| not_found(path.to_string()))?,
        None => work_dir.clone(),
    };

    let names = path.names();
    if names.is_empty() {
        return Ok(DirectoryEntry { directory: current.clone(), name: None, file: Some(current) });
    }

    for (i, name) in names.iter().enumerate() {
        let is_last = i == names.len() - 1;

        if name.is_self() {
            continue;
        }
        if name.is_parent() {
            current = current
                .with_directory(|dir| dir.parent())
                .ok_or_else(|| not_found(path.to_string()))?;
            continue;
        }

        let found = current
            .with_directory(|dir| dir.get(name))
            .ok_or_else(|| not_found(path.to_string()))?;

        let found = match found {
            Some(file) => file,
            None => {
                if is_last {
                    return Ok(DirectoryEntry { directory: current, name: Some(name.clone()), file: None });
                }
                return Err(not_found(path.to_string()));
            }
        };

        let should_follow = found.is_symbolic_link() && !(is_last && options.nofollow_links);
        if should_follow {
            *traversals += 1;
            if *traversals > MAX_SYMLINK_TRAVERSALS {
                return Err(loop_error(path.to_string()));
            }
            let target = found.symbolic_link_target().expect("checked is_symbolic_link above");
            let resolved = look_up_inner(tree, &current, &target, LinkOptions::default(), traversals)?;
            let resolved_file = resolved.file.ok_or_else(|| not_found(path.to_string()))?;
            if is_last {
                return Ok(DirectoryEntry {
                    directory: current,
                    name: Some(name.clone()),
                    file: Some(resolved_file),
                });
            }
            if !resolved_file.is_directory() {
                return Err(not_found(path.to_string()));
            }
            current = resolved_file;
            continue;
        }

        if is_last {
            return Ok(DirectoryEntry { directory: current, name: Some(name.clone()), file: Some(found) });
        }
        if !found.is_directory() {
            return Err(not_found(path.to_string()));
        }
        current = found;
    }

    unreachable!("names is non-empty, so the loop above always returns")
}
