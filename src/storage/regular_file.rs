//! [`RegularFile`]: content stored as an ordered list of blocks
//! (spec §3, §4.3).

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::{FsError, FsResult};
use crate::sync::FairRwLock;

use super::heap_disk::HeapDisk;
use super::Block;

struct State {
    blocks: Vec<Block>,
    size: u64,
}

/// Random-access byte content backed by `HeapDisk` blocks, plus the
/// lifecycle counters that decide when its blocks may be freed.
pub struct RegularFile {
    disk: Arc<HeapDisk>,
    state: Mutex<State>,
    open_count: AtomicU32,
    /// The read-preferring fair lock `FileChannel` operations serialize
    /// through (spec §5: "Each `RegularFile` has a read-preferring fair
    /// readers-writer lock").
    content_lock: FairRwLock,
}

impl RegularFile {
    pub fn new(disk: Arc<HeapDisk>) -> Self {
        RegularFile {
            disk,
            state: Mutex::new(State { blocks: Vec::new(), size: 0 }),
            open_count: AtomicU32::new(0),
            content_lock: FairRwLock::new(),
        }
    }

    pub fn content_lock(&self) -> &FairRwLock {
        &self.content_lock
    }

    pub fn size(&self) -> u64 {
        self.state.lock().unwrap().size
    }

    pub fn block_count(&self) -> usize {
        self.state.lock().unwrap().blocks.len()
    }

    pub fn opened(&self) {
        self.open_count.fetch_add(1, Ordering::SeqCst);
    }

    pub fn closed(&self) {
        self.open_count.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn open_count(&self) -> u32 {
        self.open_count.load(Ordering::SeqCst)
    }

    /// Frees every remaining block. Called once a file's link count and
    /// open-handle count both reach zero.
    pub fn deleted(&self) {
        let mut state = self.state.lock().unwrap();
        self.disk.free_all(&mut state.blocks);
        state.size = 0;
    }

    fn block_size(&self) -> usize {
        self.disk.block_size()
    }

    fn required_blocks(&self, byte_len: u64) -> usize {
        let block_size = self.block_size() as u64;
        byte_len.div_ceil(block_size) as usize
    }

    /// Returns `-1` as `size - pos` would be negative, else the number of
    /// bytes actually copied into `dst` (`min(dst.len(), size - pos)`).
    pub fn read(&self, pos: u64, dst: &mut [u8]) -> FsResult<i64> {
        let state = self.state.lock().unwrap();
        if pos >= state.size {
            return Ok(-1);
        }
        let available = (state.size - pos) as usize;
        let to_copy = dst.len().min(available);
        self.copy_from_blocks(&state.blocks, pos, &mut dst[..to_copy]);
        Ok(to_copy as i64)
    }

    /// Grows the file to at least `pos + src.len()`, zero-filling any gap
    /// between the old size and `pos`, and writes `src` at `pos`.
    pub fn write(&self, pos: u64, src: &[u8]) -> FsResult<usize> {
        if src.is_empty() {
            return Ok(0);
        }
        let mut state = self.state.lock().unwrap();
        let end = pos + src.len() as u64;
        let needed_blocks = self.required_blocks(end);
        if needed_blocks > state.blocks.len() {
            let delta = needed_blocks - state.blocks.len();
            self.disk.allocate(&mut state.blocks, delta)?;
        }
        self.copy_into_blocks(&mut state.blocks, pos, src);
        state.size = state.size.max(end);
        Ok(src.len())
    }

    /// `newSize >= size` is a no-op; otherwise frees blocks beyond
    /// `ceil(newSize / blockSize)` and sets `size = newSize`.
    pub fn truncate(&self, new_size: u64) -> FsResult<()> {
        let mut state = self.state.lock().unwrap();
        if new_size >= state.size {
            return Ok(());
        }
        let keep_blocks = self.required_blocks(new_size);
        if keep_blocks < state.blocks.len() {
            let drop_count = state.blocks.len() - keep_blocks;
            self.disk.free(&mut state.blocks, drop_count);
        }
        state.size = new_size;
        Ok(())
    }

    /// Scatter-read into `dsts`, treated as one concatenated logical
    /// buffer. Returns `-1` under the same out-of-range condition as
    /// [`Self::read`], else the number of bytes actually copied.
    pub fn read_vectored(&self, pos: u64, dsts: &mut [std::io::IoSliceMut<'_>]) -> FsResult<i64> {
        let state = self.state.lock().unwrap();
        if pos >= state.size {
            return Ok(-1);
        }
        let mut remaining = (state.size - pos) as usize;
        let mut cursor = pos;
        let mut total = 0usize;
        for dst in dsts.iter_mut() {
            if remaining == 0 {
                break;
            }
            let chunk = dst.len().min(remaining);
            self.copy_from_blocks(&state.blocks, cursor, &mut (**dst)[..chunk]);
            cursor += chunk as u64;
            remaining -= chunk;
            total += chunk;
        }
        Ok(total as i64)
    }

    /// Scatter-write from `srcs`, treated as one concatenated logical
    /// buffer. Grows the file and zero-fills any gap exactly as
    /// [`Self::write`].
    pub fn write_vectored(&self, pos: u64, srcs: &[std::io::IoSlice<'_>]) -> FsResult<usize> {
        let total_len: usize = srcs.iter().map(|s| s.len()).sum();
        if total_len == 0 {
            return Ok(0);
        }
        let mut state = self.state.lock().unwrap();
        let end = pos + total_len as u64;
        let needed_blocks = self.required_blocks(end);
        if needed_blocks > state.blocks.len() {
            let delta = needed_blocks - state.blocks.len();
            self.disk.allocate(&mut state.blocks, delta)?;
        }
        let mut cursor = pos;
        for src in srcs {
            if src.is_empty() {
                continue;
            }
            self.copy_into_blocks(&mut state.blocks, cursor, &**src);
            cursor += src.len() as u64;
        }
        state.size = state.size.max(end);
        Ok(total_len)
    }

    /// Equivalent to a read/write loop; does not move the caller's own
    /// channel position (callers manage that separately).
    pub fn transfer_to(&self, pos: u64, count: u64, sink: &mut dyn std::io::Write) -> FsResult<u64> {
        let mut remaining = count;
        let mut cursor = pos;
        let mut buf = vec![0u8; self.block_size().max(1)];
        let mut total = 0u64;
        while remaining > 0 {
            let chunk = buf.len().min(remaining as usize);
            match self.read(cursor, &mut buf[..chunk])? {
                -1 => break,
                n => {
                    let n = n as usize;
                    sink.write_all(&buf[..n]).map_err(|e| FsError::with_message(crate::error::ErrorKind::Io, e.to_string()))?;
                    cursor += n as u64;
                    total += n as u64;
                    remaining -= n as u64;
                    if n < chunk {
                        break;
                    }
                }
            }
        }
        Ok(total)
    }

    pub fn transfer_from(&self, src: &mut dyn std::io::Read, pos: u64, count: u64) -> FsResult<u64> {
        let mut remaining = count;
        let mut cursor = pos;
        let mut buf = vec![0u8; self.block_size().max(1)];
        let mut total = 0u64;
        while remaining > 0 {
            let chunk = buf.len().min(remaining as usize);
            let n = src.read(&mut buf[..chunk]).map_err(|e| FsError::with_message(crate::error::ErrorKind::Io, e.to_string()))?;
            if n == 0 {
                break;
            }
            self.write(cursor, &buf[..n])?;
            cursor += n as u64;
            total += n as u64;
            remaining -= n as u64;
        }
        Ok(total)
    }

    /// A new, empty file sharing this file's disk but none of its blocks.
    pub fn copy_without_content(&self) -> RegularFile {
        RegularFile::new(self.disk.clone())
    }

    /// Copies this file's blocks (and size) into `other`, which must be
    /// freshly created (e.g. via `copy_without_content`).
    pub fn copy_content_to(&self, other: &RegularFile) -> FsResult<()> {
        let state = self.state.lock().unwrap();
        let mut other_state = other.state.lock().unwrap();
        if !other_state.blocks.is_empty() {
            other.disk.free_all(&mut other_state.blocks);
        }
        if !state.blocks.is_empty() {
            other.disk.allocate(&mut other_state.blocks, state.blocks.len())?;
            for (src, dst) in state.blocks.iter().zip(other_state.blocks.iter_mut()) {
                dst.copy_from_slice(src);
            }
        }
        other_state.size = state.size;
        Ok(())
    }

    fn copy_from_blocks(&self, blocks: &[Block], pos: u64, dst: &mut [u8]) {
        let block_size = self.block_size() as u64;
        let mut cursor = pos;
        let mut written = 0usize;
        while written < dst.len() {
            let block_index = (cursor / block_size) as usize;
            let offset_in_block = (cursor % block_size) as usize;
            let block = &blocks[block_index];
            let available = block.len() - offset_in_block;
            let chunk = available.min(dst.len() - written);
            dst[written..written + chunk].copy_from_slice(&block[offset_in_block..offset_in_block + chunk]);
            written += chunk;
            cursor += chunk as u64;
        }
    }

    fn copy_into_blocks(&self, blocks: &mut [Block], pos: u64, src: &[u8]) {
        let block_size = self.block_size() as u64;
        let mut cursor = pos;
        let mut read = 0usize;
        while read < src.len() {
            let block_index = (cursor / block_size) as usize;
            let offset_in_block = (cursor % block_size) as usize;
            let block = &mut blocks[block_index];
            let available = block.len() - offset_in_block;
            let chunk = available.min(src.len() - read);
            block[offset_in_block..offset_in_block + chunk].copy_from_slice(&src[read..read + chunk]);
            read += chunk;
            cursor += chunk as u64;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::CacheCapacity;

    fn disk() -> Arc<HeapDisk> {
        Arc::new(HeapDisk::new(4, 1 << 20, CacheCapacity::Unbounded))
    }

    #[test]
    fn read_after_write_round_trips() {
        let file = RegularFile::new(disk());
        file.write(0, b"hello world").unwrap();
        let mut buf = [0u8; 11];
        assert_eq!(file.read(0, &mut buf).unwrap(), 11);
        assert_eq!(&buf, b"hello world");
    }

    #[test]
    fn read_past_size_is_eof() {
        let file = RegularFile::new(disk());
        file.write(0, b"hi").unwrap();
        let mut buf = [0u8; 4];
        assert_eq!(file.read(2, &mut buf).unwrap(), -1);
    }

    #[test]
    fn write_past_size_zero_fills_gap() {
        let file = RegularFile::new(disk());
        file.write(0, b"ab").unwrap();
        file.write(5, b"cd").unwrap();
        let mut buf = [0u8; 7];
        assert_eq!(file.read(0, &mut buf).unwrap(), 7);
        assert_eq!(&buf, b"ab\0\0\0cd");
    }

    #[test]
    fn truncate_then_write_past_new_size_reads_zero_in_gap() {
        let file = RegularFile::new(disk());
        file.write(0, &[1u8; 10]).unwrap();
        file.truncate(4).unwrap();
        file.write(8, b"xy").unwrap();
        let mut buf = [0u8; 10];
        assert_eq!(file.read(0, &mut buf).unwrap(), 10);
        assert_eq!(&buf[4..8], &[0, 0, 0, 0]);
        assert_eq!(&buf[8..10], b"xy");
    }

    #[test]
    fn scatter_write_then_gather_read_round_trips() {
        use std::io::{IoSlice, IoSliceMut};

        let file = RegularFile::new(disk());
        let srcs = [IoSlice::new(b"hel"), IoSlice::new(b"lo "), IoSlice::new(b"world")];
        assert_eq!(file.write_vectored(0, &srcs).unwrap(), 11);

        let mut a = [0u8; 4];
        let mut b = [0u8; 7];
        let mut dsts = [IoSliceMut::new(&mut a), IoSliceMut::new(&mut b)];
        assert_eq!(file.read_vectored(0, &mut dsts).unwrap(), 11);
        assert_eq!(&a, b"hell");
        assert_eq!(&b, b"o world");
    }

    #[test]
    fn truncate_growing_is_a_no_op() {
        let file = RegularFile::new(disk());
        file.write(0, b"hi").unwrap();
        file.truncate(100).unwrap();
        assert_eq!(file.size(), 2);
    }
}
