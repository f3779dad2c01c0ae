//! [`FileSystemRegistry`]: a process-scoped, name-keyed table of live
//! filesystem instances (spec §9 "Global state / singleton file-system
//! registry" — "model as an explicit process-scoped registry... no
//! module-level mutable globals"). Grounded on [`crate::sync::interrupt_registry`]'s
//! `OnceLock`-backed singleton, the one place this crate already needed
//! genuinely global state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use tracing::{debug, warn};

use crate::error::{ErrorKind, FsError, FsResult};
use crate::filesystem::FileSystem;

pub struct FileSystemRegistry {
    instances: Mutex<HashMap<String, Arc<FileSystem>>>,
}

impl FileSystemRegistry {
    fn new() -> FileSystemRegistry {
        FileSystemRegistry { instances: Mutex::new(HashMap::new()) }
    }

    /// Registers `fs` under `name`, lazily creating the registry's backing
    /// map on first use. Fails if `name` is already taken.
    pub fn register(&self, name: impl Into<String>, fs: Arc<FileSystem>) -> FsResult<()> {
        let name = name.into();
        let mut instances = self.instances.lock().unwrap();
        if instances.contains_key(&name) {
            warn!(name = %name, "refused to register a filesystem under a name already in use");
            return Err(FsError::with_path(ErrorKind::AlreadyExists, name));
        }
        debug!(name = %name, "registered filesystem instance");
        instances.insert(name, fs);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<FileSystem>> {
        self.instances.lock().unwrap().get(name).cloned()
    }

    /// Removes `name` from the registry. Does not close the filesystem —
    /// callers close it explicitly, which is what triggers this removal
    /// in normal operation (see `FileSystem::close`).
    pub fn remove(&self, name: &str) -> Option<Arc<FileSystem>> {
        self.instances.lock().unwrap().remove(name)
    }
}

/// The single process-wide registry instance.
pub fn registry() -> &'static FileSystemRegistry {
    static REGISTRY: OnceLock<FileSystemRegistry> = OnceLock::new();
    REGISTRY.get_or_init(FileSystemRegistry::new)
}
