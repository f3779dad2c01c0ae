//! [`FileSystemState`]: the open/closed flag and resource registry every
//! filesystem-touching operation checks first (spec §4.7). Grounded on
//! the teacher's per-connection task lifecycle (`src/vfs_task.rs` owning
//! and tearing down `ReadTask`/`StreamWriter`), generalized from "one
//! socket's tasks" to "one filesystem's closeable resources".

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tracing::warn;

use crate::error::{ErrorKind, FsError, FsResult};

/// Anything returned to callers that holds filesystem state: channels,
/// streams, directory streams, the watch service. Registered with
/// [`FileSystemState`] so a filesystem-wide close cascades to it.
pub trait Closeable: Send + Sync {
    fn close(&self) -> FsResult<()>;
}

pub struct FileSystemState {
    open: AtomicBool,
    resources: Mutex<HashMap<u64, Arc<dyn Closeable>>>,
    next_id: AtomicU64,
}

impl FileSystemState {
    pub fn new() -> FileSystemState {
        FileSystemState { open: AtomicBool::new(true), resources: Mutex::new(HashMap::new()), next_id: AtomicU64::new(1) }
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    pub fn check_open(&self) -> FsResult<()> {
        if !self.is_open() {
            return Err(FsError::with_message(ErrorKind::Closed, "filesystem is closed"));
        }
        Ok(())
    }

    /// Registers `resource`, returning a token for later [`Self::unregister`].
    pub fn register(&self, resource: Arc<dyn Closeable>) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.resources.lock().unwrap().insert(id, resource);
        id
    }

    pub fn unregister(&self, id: u64) {
        self.resources.lock().unwrap().remove(&id);
    }

    /// Idempotent. Closes every registered resource; the first failure
    /// becomes the returned error, with every subsequent failure attached
    /// as a suppressed error.
    pub fn close(&self) -> FsResult<()> {
        if !self.open.swap(false, Ordering::SeqCst) {
            return Ok(());
        }
        let resources: Vec<Arc<dyn Closeable>> = self.resources.lock().unwrap().drain().map(|(_, v)| v).collect();

        let mut primary: Option<FsError> = None;
        for resource in resources {
            if let Err(err) = resource.close() {
                warn!(error = %err, "resource failed to close during filesystem shutdown");
                match &mut primary {
                    None => primary = Some(err),
                    Some(first) => first.add_suppressed(err),
                }
            }
        }
        match primary {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Default for FileSystemState {
    fn default() -> Self {
        FileSystemState::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingResource;
    impl Closeable for FailingResource {
        fn close(&self) -> FsResult<()> {
            Err(FsError::with_message(ErrorKind::Io, "boom"))
        }
    }

    struct OkResource;
    impl Closeable for OkResource {
        fn close(&self) -> FsResult<()> {
            Ok(())
        }
    }

    #[test]
    fn close_is_idempotent_and_checks_open() {
        let state = FileSystemState::new();
        assert!(state.check_open().is_ok());
        state.close().unwrap();
        assert!(state.check_open().is_err());
        assert!(state.close().is_ok());
    }

    #[test]
    fn secondary_close_failures_are_suppressed_on_the_first() {
        let state = FileSystemState::new();
        state.register(Arc::new(FailingResource));
        state.register(Arc::new(FailingResource));
        state.register(Arc::new(OkResource));
        let err = state.close().unwrap_err();
        assert_eq!(err.suppressed.len(), 1);
    }

    #[test]
    fn unregistered_resources_are_not_closed() {
        let state = FileSystemState::new();
        let id = state.register(Arc::new(FailingResource));
        state.unregister(id);
        assert!(state.close().is_ok());
    }
}
