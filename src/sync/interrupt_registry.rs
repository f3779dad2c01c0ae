//! A process-wide thread-interrupt flag (spec §4.4/§5), since
//! `std::thread` has no `Thread.interrupt()` equivalent. Keyed by
//! `ThreadId`, modeled as an explicit process-scoped registry per spec
//! §9's "global state / singleton" guidance rather than a module-level
//! mutable global.

use std::collections::HashSet;
use std::sync::{Mutex, OnceLock};
use std::thread::ThreadId;

#[derive(Default)]
pub struct InterruptRegistry {
    interrupted: Mutex<HashSet<ThreadId>>,
}

impl InterruptRegistry {
    pub fn new() -> InterruptRegistry {
        InterruptRegistry::default()
    }

    /// Marks `thread` interrupted. The next interruptible operation on
    /// that thread observes and clears it.
    pub fn interrupt(&self, thread: ThreadId) {
        self.interrupted.lock().unwrap().insert(thread);
    }

    pub fn is_interrupted(&self, thread: ThreadId) -> bool {
        self.interrupted.lock().unwrap().contains(&thread)
    }

    /// Observes and clears the flag, mirroring `Thread.interrupted()`.
    pub fn take_interrupt(&self, thread: ThreadId) -> bool {
        self.interrupted.lock().unwrap().remove(&thread)
    }
}

/// The single process-wide registry every `FileChannel` consults.
pub fn interrupt_registry() -> &'static InterruptRegistry {
    static REGISTRY: OnceLock<InterruptRegistry> = OnceLock::new();
    REGISTRY.get_or_init(InterruptRegistry::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interrupt_is_observed_once() {
        let registry = InterruptRegistry::new();
        let id = std::thread::current().id();
        assert!(!registry.is_interrupted(id));
        registry.interrupt(id);
        assert!(registry.is_interrupted(id));
        assert!(registry.take_interrupt(id));
        assert!(!registry.is_interrupted(id));
    }
}
