//! [`PollingWatchService`]: owns the background polling thread and the
//! ready queue of keys with pending events.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::error::{ErrorKind, FsError, FsResult};
use crate::tree::File;

use super::key::{Event, EventKind, WatchKey};

pub struct PollingWatchService {
    interval: Duration,
    keys: Arc<Mutex<Vec<Arc<WatchKey>>>>,
    ready_tx: async_channel::Sender<Arc<WatchKey>>,
    ready_rx: async_channel::Receiver<Arc<WatchKey>>,
    running: Arc<AtomicBool>,
    closed: AtomicBool,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl PollingWatchService {
    pub fn new(interval: Duration) -> PollingWatchService {
        let (ready_tx, ready_rx) = async_channel::unbounded();
        PollingWatchService {
            interval,
            keys: Arc::new(Mutex::new(Vec::new())),
            ready_tx,
            ready_rx,
            running: Arc::new(AtomicBool::new(false)),
            closed: AtomicBool::new(false),
            worker: Mutex::new(None),
        }
    }

    fn check_open(&self) -> FsResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(FsError::with_message(ErrorKind::Closed, "watch service is closed"));
        }
        Ok(())
    }

    /// Registers `directory` for `kinds`. `directory` must already be a
    /// resolved, live directory file — callers resolve the path first so
    /// `NotFound`/`NotDirectory` surface from that lookup, matching the
    /// registration failure modes spec §4.6 describes.
    pub fn register(&self, directory: Arc<File>, kinds: Vec<EventKind>) -> FsResult<Arc<WatchKey>> {
        self.check_open()?;
        if !directory.is_directory() {
            return Err(FsError::new(ErrorKind::NotDirectory));
        }
        let key = Arc::new(WatchKey::new(directory, kinds));
        *key.snapshot.lock().unwrap() = take_snapshot(&key.directory);
        self.keys.lock().unwrap().push(key.clone());
        self.ensure_running();
        Ok(key)
    }

    /// Starts the background poll loop the first time a key registers.
    fn ensure_running(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }
        let keys = self.keys.clone();
        let ready_tx = self.ready_tx.clone();
        let running = self.running.clone();
        let interval = self.interval;
        let handle = std::thread::spawn(move || {
            while running.load(Ordering::SeqCst) {
                std::thread::sleep(interval);
                let snapshot: Vec<Arc<WatchKey>> = {
                    let mut guard = keys.lock().unwrap();
                    guard.retain(|key| key.is_valid());
                    guard.clone()
                };
                for key in &snapshot {
                    if diff_and_offer(key) && ready_tx.send_blocking(key.clone()).is_err() {
                        return;
                    }
                }
            }
        });
        *self.worker.lock().unwrap() = Some(handle);
    }

    pub fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        for key in self.keys.lock().unwrap().drain(..) {
            key.cancel();
        }
        self.running.store(false, Ordering::SeqCst);
        self.ready_tx.close();
        if let Some(handle) = self.worker.lock().unwrap().take() {
            let _ = handle.join();
        }
    }

    /// Blocks until a key has pending events.
    pub fn take(&self) -> FsResult<Arc<WatchKey>> {
        self.check_open()?;
        self.ready_rx.recv_blocking().map_err(|_| FsError::with_message(ErrorKind::Closed, "watch service is closed"))
    }

    /// Async counterpart of [`Self::take`], for callers already on a
    /// `tokio` runtime instead of a dedicated blocking thread.
    pub async fn take_async(&self) -> FsResult<Arc<WatchKey>> {
        self.check_open()?;
        self.ready_rx.recv().await.map_err(|_| FsError::with_message(ErrorKind::Closed, "watch service is closed"))
    }

    /// Non-blocking variant of [`Self::take`].
    pub fn poll(&self) -> Option<Arc<WatchKey>> {
        self.ready_rx.try_recv().ok()
    }
}

fn take_snapshot(directory: &Arc<File>) -> std::collections::HashMap<crate::path::Name, std::time::SystemTime> {
    directory
        .with_directory(|dir| dir.entries().map(|(name, file)| (name.clone(), file.last_modified_time())).collect())
        .unwrap_or_default()
}

fn diff_and_offer(key: &Arc<WatchKey>) -> bool {
    let new_snapshot = take_snapshot(&key.directory);
    let mut old_snapshot = key.snapshot.lock().unwrap();

    let mut created_or_modified: Vec<Event> = new_snapshot
        .iter()
        .filter_map(|(name, mtime)| match old_snapshot.get(name) {
            None => Some(Event { kind: EventKind::Create, name: name.clone() }),
            Some(old_mtime) if old_mtime != mtime => Some(Event { kind: EventKind::Modify, name: name.clone() }),
            Some(_) => None,
        })
        .collect();
    created_or_modified.sort_by(|a, b| a.name.display().cmp(b.name.display()));

    let mut deleted: Vec<Event> = old_snapshot
        .keys()
        .filter(|name| !new_snapshot.contains_key(*name))
        .map(|name| Event { kind: EventKind::Delete, name: name.clone() })
        .collect();
    deleted.sort_by(|a, b| a.name.display().cmp(b.name.display()));

    let mut became_ready = false;
    for event in created_or_modified.into_iter().chain(deleted) {
        became_ready |= key.offer(event);
    }
    *old_snapshot = new_snapshot;
    became_ready
}
