//! [`WatchKey`]: one directory registration's accumulated events.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::path::Name;
use crate::tree::File;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Create,
    Modify,
    Delete,
}

#[derive(Debug, Clone)]
pub struct Event {
    pub kind: EventKind,
    pub name: Name,
}

pub struct WatchKey {
    pub(super) directory: Arc<File>,
    pub(super) kinds: Vec<EventKind>,
    pub(super) snapshot: Mutex<std::collections::HashMap<Name, std::time::SystemTime>>,
    events: Mutex<VecDeque<Event>>,
    valid: AtomicBool,
}

impl WatchKey {
    pub(super) fn new(directory: Arc<File>, kinds: Vec<EventKind>) -> WatchKey {
        WatchKey { directory, kinds, snapshot: Mutex::new(std::collections::HashMap::new()), events: Mutex::new(VecDeque::new()), valid: AtomicBool::new(true) }
    }

    pub fn is_valid(&self) -> bool {
        self.valid.load(Ordering::SeqCst)
    }

    pub(super) fn cancel(&self) {
        self.valid.store(false, Ordering::SeqCst);
    }

    /// Appends `event` if its kind was requested at registration time.
    /// Returns `true` if this transitioned the key from empty to
    /// non-empty (the caller should then enqueue it on the ready queue).
    pub(super) fn offer(&self, event: Event) -> bool {
        if !self.kinds.contains(&event.kind) {
            return false;
        }
        let mut events = self.events.lock().unwrap();
        let was_empty = events.is_empty();
        events.push_back(event);
        was_empty
    }

    /// Drains and returns the accumulated events. Per the watch-key
    /// contract, the key must be `reset()` before it can transition to
    /// non-empty and be re-queued.
    pub fn poll_events(&self) -> Vec<Event> {
        self.events.lock().unwrap().drain(..).collect()
    }

    /// Re-arms the key so it can be queued again once new events arrive.
    pub fn reset(&self) -> bool {
        self.is_valid()
    }
}
