//! A read-preferring fair readers-writer lock (spec §5: "Each `RegularFile`
//! has a read-preferring fair readers-writer lock").

use std::sync::{Condvar, Mutex};
use std::time::Duration;

/// How often a cancellable acquire re-checks its abort predicate. A real
/// cancellable-lock primitive would wake instantly on close; polling is the
/// practical approximation available on top of `std::sync::Condvar`.
const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(10);

struct Inner {
    readers: u32,
    writer: bool,
}

pub struct FairRwLock {
    inner: Mutex<Inner>,
    readers_idle: Condvar,
    writer_idle: Condvar,
}

impl FairRwLock {
    pub fn new() -> FairRwLock {
        FairRwLock {
            inner: Mutex::new(Inner { readers: 0, writer: false }),
            readers_idle: Condvar::new(),
            writer_idle: Condvar::new(),
        }
    }

    /// Blocks until no writer holds the lock, then joins the readers.
    /// Read-preferring: a reader never waits behind a merely-waiting
    /// writer, only behind one that is actively holding the lock.
    pub fn read(&self) -> FairReadGuard<'_> {
        let mut inner = self.inner.lock().unwrap();
        while inner.writer {
            inner = self.writer_idle.wait(inner).unwrap();
        }
        inner.readers += 1;
        FairReadGuard { lock: self }
    }

    /// Blocks until neither a writer nor any reader holds the lock.
    pub fn write(&self) -> FairWriteGuard<'_> {
        let mut inner = self.inner.lock().unwrap();
        while inner.writer || inner.readers > 0 {
            inner = self.readers_idle.wait(inner).unwrap();
        }
        inner.writer = true;
        FairWriteGuard { lock: self }
    }

    /// Like [`Self::read`], but re-checks `should_abort` between polls so a
    /// concurrent close can unblock the wait promptly instead of forever.
    pub fn read_cancellable(&self, should_abort: impl Fn() -> bool) -> Option<FairReadGuard<'_>> {
        let mut inner = self.inner.lock().unwrap();
        loop {
            if should_abort() {
                return None;
            }
            if !inner.writer {
                break;
            }
            inner = self.writer_idle.wait_timeout(inner, CANCEL_POLL_INTERVAL).unwrap().0;
        }
        inner.readers += 1;
        Some(FairReadGuard { lock: self })
    }

    /// Like [`Self::write`], with the same cancellation behavior as
    /// [`Self::read_cancellable`].
    pub fn write_cancellable(&self, should_abort: impl Fn() -> bool) -> Option<FairWriteGuard<'_>> {
        let mut inner = self.inner.lock().unwrap();
        loop {
            if should_abort() {
                return None;
            }
            if !inner.writer && inner.readers == 0 {
                break;
            }
            inner = self.readers_idle.wait_timeout(inner, CANCEL_POLL_INTERVAL).unwrap().0;
        }
        inner.writer = true;
        Some(FairWriteGuard { lock: self })
    }

    fn release_read(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.readers -= 1;
        if inner.readers == 0 {
            self.readers_idle.notify_one();
        }
    }

    fn release_write(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.writer = false;
        self.writer_idle.notify_all();
        self.readers_idle.notify_one();
    }
}

impl Default for FairRwLock {
    fn default() -> Self {
        Self::new()
    }
}

pub struct FairReadGuard<'a> {
    lock: &'a FairRwLock,
}

impl Drop for FairReadGuard<'_> {
    fn drop(&mut self) {
        self.lock.release_read();
    }
}

pub struct FairWriteGuard<'a> {
    lock: &'a FairRwLock,
}

impl Drop for FairWriteGuard<'_> {
    fn drop(&mut self) {
        self.lock.release_write();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn readers_can_share_the_lock() {
        let lock = Arc::new(FairRwLock::new());
        let a = lock.read();
        let b = lock.read();
        drop(a);
        drop(b);
    }

    #[test]
    fn writer_excludes_readers() {
        let lock = Arc::new(FairRwLock::new());
        let lock2 = lock.clone();
        let guard = lock.write();
        let handle = thread::spawn(move || {
            let _g = lock2.read();
        });
        thread::sleep(std::time::Duration::from_millis(20));
        assert!(!handle.is_finished());
        drop(guard);
        handle.join().unwrap();
    }
}
