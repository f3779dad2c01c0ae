//! File tree and directory tables (spec §3, §4.2).

mod directory;
mod file;
mod file_tree;
mod lookup;

pub use directory::Directory;
pub use file::{AttributeValue, File, FileKind};
pub use file_tree::FileTree;
pub use lookup::{look_up, DirectoryEntry, LinkOptions};
