//! Byte-range advisory locks: per-channel, validated on release,
//! overlapping ranges on the same channel rejected (spec §4.4 item 7).

use std::sync::{Condvar, Mutex};
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// `end == None` means "to the current end of file", mirroring
/// `java.nio.channels.FileLock`'s `Long.MAX_VALUE` convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: Option<u64>,
}

impl ByteRange {
    pub fn new(start: u64, size: Option<u64>) -> ByteRange {
        ByteRange { start, end: size.map(|s| start + s) }
    }

    fn overlaps(&self, other: &ByteRange) -> bool {
        let self_end = self.end.unwrap_or(u64::MAX);
        let other_end = other.end.unwrap_or(u64::MAX);
        self.start < other_end && other.start < self_end
    }
}

/// An acquired lock; dropping it releases the range.
pub struct RangeLockGuard<'a> {
    table: &'a ByteRangeLockTable,
    range: ByteRange,
}

impl Drop for RangeLockGuard<'_> {
    fn drop(&mut self) {
        self.table.release(self.range);
    }
}

#[derive(Default)]
pub struct ByteRangeLockTable {
    held: Mutex<Vec<ByteRange>>,
    released: Condvar,
}

impl ByteRangeLockTable {
    pub fn new() -> ByteRangeLockTable {
        ByteRangeLockTable::default()
    }

    fn conflicts(held: &[ByteRange], range: &ByteRange) -> bool {
        held.iter().any(|existing| existing.overlaps(range))
    }

    /// Non-blocking; returns `None` on conflict (mirrors `tryLock`).
    pub fn try_lock(&self, range: ByteRange) -> Option<RangeLockGuard<'_>> {
        let mut held = self.held.lock().unwrap();
        if Self::conflicts(&held, &range) {
            return None;
        }
        held.push(range);
        Some(RangeLockGuard { table: self, range })
    }

    /// Blocks until the range is free or `should_abort` becomes true.
    pub fn lock(&self, range: ByteRange, should_abort: impl Fn() -> bool) -> Option<RangeLockGuard<'_>> {
        let mut held = self.held.lock().unwrap();
        loop {
            if should_abort() {
                return None;
            }
            if !Self::conflicts(&held, &range) {
                held.push(range);
                return Some(RangeLockGuard { table: self, range });
            }
            held = self.released.wait_timeout(held, POLL_INTERVAL).unwrap().0;
        }
    }

    fn release(&self, range: ByteRange) {
        let mut held = self.held.lock().unwrap();
        if let Some(pos) = held.iter().position(|r| *r == range) {
            held.remove(pos);
        }
        self.released.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlapping_ranges_conflict() {
        let table = ByteRangeLockTable::new();
        let _a = table.try_lock(ByteRange::new(0, Some(10))).unwrap();
        assert!(table.try_lock(ByteRange::new(5, Some(10))).is_none());
        assert!(table.try_lock(ByteRange::new(10, Some(5))).is_some());
    }

    #[test]
    fn release_frees_the_range() {
        let table = ByteRangeLockTable::new();
        let guard = table.try_lock(ByteRange::new(0, Some(10))).unwrap();
        drop(guard);
        assert!(table.try_lock(ByteRange::new(0, Some(10))).is_some());
    }
}
