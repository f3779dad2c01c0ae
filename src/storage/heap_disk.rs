//! [`HeapDisk`]: fixed-block allocator with a LIFO free-block cache
//! (spec §3, §4.3). Grounded on the free-list/pool discipline of the
//! teacher's intrusive `Allocator`/`Chain` (`src/allocator.rs`), rewritten
//! as a safe `Vec`-backed stack behind a `Mutex` rather than an unsafe
//! intrusive linked list over raw pointers, since the spec needs an
//! exactly-testable LIFO reuse order rather than a lock-free buffer pool.

use std::sync::Mutex;

use crate::error::{ErrorKind, FsError, FsResult};

use super::Block;

/// How the free-block cache bounds itself. `-1`/`0`/positive from
/// configuration map to `Unbounded`/`Disabled`/`Bounded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheCapacity {
    Unbounded,
    Disabled,
    Bounded(usize),
}

impl CacheCapacity {
    pub fn from_config(max_cache_size: i64, block_size: usize) -> Self {
        if max_cache_size < 0 {
            CacheCapacity::Unbounded
        } else if max_cache_size == 0 {
            CacheCapacity::Disabled
        } else {
            CacheCapacity::Bounded((max_cache_size as usize) / block_size.max(1))
        }
    }

    fn room(self, current: usize) -> usize {
        match self {
            CacheCapacity::Unbounded => usize::MAX,
            CacheCapacity::Disabled => 0,
            CacheCapacity::Bounded(k) => k.saturating_sub(current),
        }
    }
}

struct Inner {
    allocated_block_count: usize,
    free_cache: Vec<Block>,
}

/// Fixed block size `B`, capacity `C` (truncated to a multiple of `B`), and
/// a LIFO free-block cache of capacity `K`.
pub struct HeapDisk {
    block_size: usize,
    capacity_blocks: usize,
    cache_capacity: CacheCapacity,
    inner: Mutex<Inner>,
}

impl HeapDisk {
    pub fn new(block_size: usize, total_capacity: u64, cache_capacity: CacheCapacity) -> Self {
        let capacity_blocks = (total_capacity / block_size as u64) as usize;
        HeapDisk {
            block_size,
            capacity_blocks,
            cache_capacity,
            inner: Mutex::new(Inner { allocated_block_count: 0, free_cache: Vec::new() }),
        }
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn allocated_block_count(&self) -> usize {
        self.inner.lock().unwrap().allocated_block_count
    }

    /// Bytes not yet handed out to any file. The library withholds no
    /// additional reserve (see DESIGN.md Open Question resolutions).
    pub fn usable_space(&self) -> u64 {
        let inner = self.inner.lock().unwrap();
        let free_blocks = self.capacity_blocks.saturating_sub(inner.allocated_block_count);
        free_blocks as u64 * self.block_size as u64
    }

    /// Appends exactly `n` freshly zero-filled blocks to `blocks`, drawing
    /// from the free cache LIFO-first. Leaves `blocks` unmodified and fails
    /// with `OutOfSpace` if fewer than `n` blocks are available in total;
    /// partial allocation never happens.
    pub fn allocate(&self, blocks: &mut Vec<Block>, n: usize) -> FsResult<()> {
        if n == 0 {
            return Ok(());
        }
        let mut inner = self.inner.lock().unwrap();
        let available = inner.free_cache.len() + (self.capacity_blocks - inner.allocated_block_count);
        if available < n {
            return Err(FsError::with_message(
                ErrorKind::OutOfSpace,
                format!("requested {n} blocks, {available} available"),
            ));
        }
        let mut fresh = Vec::with_capacity(n);
        for _ in 0..n {
            match inner.free_cache.pop() {
                Some(block) => fresh.push(block),
                None => fresh.push(vec![0u8; self.block_size].into_boxed_slice()),
            }
        }
        inner.allocated_block_count += n;
        blocks.extend(fresh);
        Ok(())
    }

    /// Pops the last `n` blocks from `blocks` (truncation). Up to the
    /// cache's remaining room are zeroed and pushed back LIFO; the rest
    /// are dropped.
    pub fn free(&self, blocks: &mut Vec<Block>, n: usize) {
        let n = n.min(blocks.len());
        if n == 0 {
            return;
        }
        let mut inner = self.inner.lock().unwrap();
        let room = self.cache_capacity.room(inner.free_cache.len());
        let cacheable = n.min(room);
        for i in 0..n {
            let mut block = blocks.pop().expect("checked length above");
            if i < cacheable {
                block.fill(0);
                inner.free_cache.push(block);
            }
        }
        inner.allocated_block_count -= n;
    }

    /// Frees every remaining block in `blocks`.
    pub fn free_all(&self, blocks: &mut Vec<Block>) {
        let n = blocks.len();
        self.free(blocks, n);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_rolls_back_on_out_of_space() {
        let disk = HeapDisk::new(4, 8, CacheCapacity::Disabled);
        let mut blocks = Vec::new();
        disk.allocate(&mut blocks, 2).unwrap();
        assert!(disk.allocate(&mut blocks, 1).is_err());
        assert_eq!(blocks.len(), 2);
    }

    #[test]
    fn free_cache_reuse_is_lifo_and_bounded() {
        // B=4, max=10 blocks (40 bytes), cache capacity 4.
        let disk = HeapDisk::new(4, 40, CacheCapacity::Bounded(4));
        let mut blocks = Vec::new();
        disk.allocate(&mut blocks, 10).unwrap();
        disk.free_all(&mut blocks);
        assert_eq!(disk.inner.lock().unwrap().free_cache.len(), 4);

        disk.allocate(&mut blocks, 6).unwrap();
        assert_eq!(blocks.len(), 6);
        assert_eq!(disk.inner.lock().unwrap().free_cache.len(), 0);
    }

    #[test]
    fn usable_space_has_no_hidden_reserve() {
        let disk = HeapDisk::new(4, 40, CacheCapacity::Disabled);
        assert_eq!(disk.usable_space(), 40);
        let mut blocks = Vec::new();
        disk.allocate(&mut blocks, 3).unwrap();
        assert_eq!(disk.usable_space(), 40 - 12);
    }
}
