//! [`FileChannel`]: position, size, truncation, reads/writes, transfer,
//! interruption, asynchronous close, and byte-range locking over one
//! `RegularFile` (spec §4.4). Grounded on the teacher's per-operation
//! Args-style contracts (`src/vfs/read.rs`, `src/vfs/write.rs`) — kept as
//! ordinary `&self` methods returning `FsResult<T>` here since this is a
//! direct library call surface, not an RPC dispatch table; the contract
//! each documents (open check, interrupt check, lock acquisition order)
//! is the part actually carried over.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use bitflags::bitflags;

use crate::error::{ErrorKind, FsError, FsResult};
use crate::storage::RegularFile;
use crate::sync::interrupt_registry;

use super::byte_range_lock::{ByteRange, ByteRangeLockTable, RangeLockGuard};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ChannelMode: u8 {
        const READ   = 0b001;
        const WRITE  = 0b010;
        const APPEND = 0b100;
    }
}

impl std::fmt::Debug for FileChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileChannel")
            .field("mode", &self.mode)
            .field("position", &self.position.load(Ordering::Relaxed))
            .field("open", &self.open.load(Ordering::Relaxed))
            .finish()
    }
}

/// A synchronous channel over one `RegularFile`'s content.
pub struct FileChannel {
    file: Arc<RegularFile>,
    mode: ChannelMode,
    position: AtomicU64,
    open: AtomicBool,
    range_locks: ByteRangeLockTable,
}

impl FileChannel {
    pub fn new(file: Arc<RegularFile>, mode: ChannelMode) -> Arc<FileChannel> {
        file.opened();
        Arc::new(FileChannel {
            file,
            mode,
            position: AtomicU64::new(0),
            open: AtomicBool::new(true),
            range_locks: ByteRangeLockTable::new(),
        })
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    pub fn position(&self) -> u64 {
        self.position.load(Ordering::SeqCst)
    }

    pub fn set_position(&self, position: u64) -> FsResult<()> {
        self.check_open()?;
        self.position.store(position, Ordering::SeqCst);
        Ok(())
    }

    pub fn size(&self) -> u64 {
        self.file.size()
    }

    fn check_open(&self) -> FsResult<()> {
        if !self.is_open() {
            return Err(FsError::new(ErrorKind::Closed));
        }
        Ok(())
    }

    /// Closing-channel contract step 2: fail with an interrupt-induced
    /// close if the current thread was interrupted, closing the channel
    /// in the process.
    fn check_interrupted(&self) -> FsResult<()> {
        let thread = std::thread::current().id();
        if interrupt_registry().take_interrupt(thread) {
            self.close();
            return Err(FsError::with_message(ErrorKind::Interrupted, "thread interrupted"));
        }
        Ok(())
    }

    fn should_abort(&self) -> bool {
        !self.is_open()
    }

    fn async_close_error(&self) -> FsError {
        FsError::with_message(ErrorKind::AsynchronousClose, "channel closed by another thread")
    }

    /// Closes the channel. Idempotent. Operations currently blocked on the
    /// file lock observe `should_abort()` on their next poll and fail with
    /// an asynchronous-close error.
    pub fn close(&self) {
        if self.open.swap(false, Ordering::SeqCst) {
            self.file.closed();
        }
    }

    /// Reads at the current position; advances it by the number of bytes
    /// read. Returns `-1` only when the position was already at or past
    /// `size` when the read began.
    pub fn read(&self, dst: &mut [u8]) -> FsResult<i64> {
        self.check_open()?;
        self.check_interrupted()?;
        if !self.mode.contains(ChannelMode::READ) {
            return Err(FsError::new(ErrorKind::Unsupported));
        }
        let _guard =
            self.file.content_lock().read_cancellable(|| self.should_abort()).ok_or_else(|| self.async_close_error())?;
        self.check_open()?;
        let pos = self.position();
        let n = self.file.read(pos, dst)?;
        if n > 0 {
            self.position.fetch_add(n as u64, Ordering::SeqCst);
        }
        Ok(n)
    }

    /// Reads `pos` without touching the channel's own position.
    pub fn read_at(&self, pos: u64, dst: &mut [u8]) -> FsResult<i64> {
        self.check_open()?;
        self.check_interrupted()?;
        let _guard =
            self.file.content_lock().read_cancellable(|| self.should_abort()).ok_or_else(|| self.async_close_error())?;
        self.check_open()?;
        self.file.read(pos, dst)
    }

    /// Scatter-read at the current position, treating `dsts` as one
    /// concatenated logical buffer; advances the position by the total
    /// bytes copied. Returns `-1` under the same condition as [`Self::read`].
    pub fn read_vectored(&self, dsts: &mut [std::io::IoSliceMut<'_>]) -> FsResult<i64> {
        self.check_open()?;
        self.check_interrupted()?;
        if !self.mode.contains(ChannelMode::READ) {
            return Err(FsError::new(ErrorKind::Unsupported));
        }
        let _guard =
            self.file.content_lock().read_cancellable(|| self.should_abort()).ok_or_else(|| self.async_close_error())?;
        self.check_open()?;
        let pos = self.position();
        let n = self.file.read_vectored(pos, dsts)?;
        if n > 0 {
            self.position.fetch_add(n as u64, Ordering::SeqCst);
        }
        Ok(n)
    }

    /// Writes at the current position (or at `size`, for `APPEND`
    /// channels, regardless of the stored position) and advances it.
    pub fn write(&self, src: &[u8]) -> FsResult<usize> {
        self.check_open()?;
        self.check_interrupted()?;
        if !self.mode.contains(ChannelMode::WRITE) {
            return Err(FsError::new(ErrorKind::Unsupported));
        }
        let _guard = self
            .file
            .content_lock()
            .write_cancellable(|| self.should_abort())
            .ok_or_else(|| self.async_close_error())?;
        self.check_open()?;
        let pos = if self.mode.contains(ChannelMode::APPEND) { self.file.size() } else { self.position() };
        let n = self.file.write(pos, src)?;
        self.position.store(pos + n as u64, Ordering::SeqCst);
        Ok(n)
    }

    /// Scatter-write at the current position (or at `size`, for `APPEND`
    /// channels), treating `srcs` as one concatenated logical buffer;
    /// advances the position by the total bytes written.
    pub fn write_vectored(&self, srcs: &[std::io::IoSlice<'_>]) -> FsResult<usize> {
        self.check_open()?;
        self.check_interrupted()?;
        if !self.mode.contains(ChannelMode::WRITE) {
            return Err(FsError::new(ErrorKind::Unsupported));
        }
        let _guard = self
            .file
            .content_lock()
            .write_cancellable(|| self.should_abort())
            .ok_or_else(|| self.async_close_error())?;
        self.check_open()?;
        let pos = if self.mode.contains(ChannelMode::APPEND) { self.file.size() } else { self.position() };
        let n = self.file.write_vectored(pos, srcs)?;
        self.position.store(pos + n as u64, Ordering::SeqCst);
        Ok(n)
    }

    /// `write(buf, pos)` is undefined for `APPEND` channels and rejected.
    pub fn write_at(&self, pos: u64, src: &[u8]) -> FsResult<usize> {
        self.check_open()?;
        self.check_interrupted()?;
        if self.mode.contains(ChannelMode::APPEND) {
            return Err(FsError::with_message(ErrorKind::Unsupported, "positional write on an append channel"));
        }
        let _guard = self
            .file
            .content_lock()
            .write_cancellable(|| self.should_abort())
            .ok_or_else(|| self.async_close_error())?;
        self.check_open()?;
        self.file.write(pos, src)
    }

    /// `n < size` shrinks the file; in all cases `position = min(position, n)`
    /// afterward.
    pub fn truncate(&self, new_size: u64) -> FsResult<()> {
        self.check_open()?;
        let _guard = self
            .file
            .content_lock()
            .write_cancellable(|| self.should_abort())
            .ok_or_else(|| self.async_close_error())?;
        self.check_open()?;
        self.file.truncate(new_size)?;
        let position = self.position();
        if position > new_size {
            self.position.store(new_size, Ordering::SeqCst);
        }
        Ok(())
    }

    /// Does not alter this channel's own position.
    pub fn transfer_to(&self, pos: u64, count: u64, sink: &mut dyn std::io::Write) -> FsResult<u64> {
        self.check_open()?;
        let _guard =
            self.file.content_lock().read_cancellable(|| self.should_abort()).ok_or_else(|| self.async_close_error())?;
        self.check_open()?;
        self.file.transfer_to(pos, count, sink)
    }

    pub fn transfer_from(&self, src: &mut dyn std::io::Read, pos: u64, count: u64) -> FsResult<u64> {
        self.check_open()?;
        let _guard = self
            .file
            .content_lock()
            .write_cancellable(|| self.should_abort())
            .ok_or_else(|| self.async_close_error())?;
        self.check_open()?;
        self.file.transfer_from(src, pos, count)
    }

    /// Non-blocking byte-range lock; `None` on conflict.
    pub fn try_lock_range(&self, start: u64, len: Option<u64>) -> FsResult<Option<RangeLockGuard<'_>>> {
        self.check_open()?;
        Ok(self.range_locks.try_lock(ByteRange::new(start, len)))
    }

    /// Blocking byte-range lock; unblocks with `None` once the channel
    /// closes.
    pub fn lock_range(&self, start: u64, len: Option<u64>) -> FsResult<RangeLockGuard<'_>> {
        self.check_open()?;
        self.range_locks
            .lock(ByteRange::new(start, len), || self.should_abort())
            .ok_or_else(|| self.async_close_error())
    }
}

impl Drop for FileChannel {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{CacheCapacity, HeapDisk};

    fn channel(mode: ChannelMode) -> Arc<FileChannel> {
        let disk = Arc::new(HeapDisk::new(4, 1 << 16, CacheCapacity::Unbounded));
        let file = Arc::new(RegularFile::new(disk));
        FileChannel::new(file, mode)
    }

    #[test]
    fn append_write_ignores_position() {
        let ch = channel(ChannelMode::READ | ChannelMode::WRITE | ChannelMode::APPEND);
        ch.write(b"abc").unwrap();
        ch.set_position(0).unwrap();
        ch.write(b"def").unwrap();
        let mut buf = [0u8; 6];
        ch.read_at(0, &mut buf).unwrap();
        assert_eq!(&buf, b"abcdef");
    }

    #[test]
    fn truncate_clamps_position() {
        let ch = channel(ChannelMode::READ | ChannelMode::WRITE);
        ch.write(b"0123456789").unwrap();
        ch.set_position(20).unwrap();
        ch.truncate(10).unwrap();
        assert_eq!(ch.position(), 10);
        ch.truncate(2).unwrap();
        assert_eq!(ch.position(), 2);
    }

    #[test]
    fn operations_after_close_fail() {
        let ch = channel(ChannelMode::READ);
        ch.close();
        let mut buf = [0u8; 1];
        assert_eq!(ch.read(&mut buf).unwrap_err().kind, ErrorKind::Closed);
    }

    #[test]
    fn scatter_gather_round_trips_and_advances_position() {
        use std::io::{IoSlice, IoSliceMut};

        let ch = channel(ChannelMode::READ | ChannelMode::WRITE);
        let srcs = [IoSlice::new(b"foo"), IoSlice::new(b"bar")];
        assert_eq!(ch.write_vectored(&srcs).unwrap(), 6);
        assert_eq!(ch.position(), 6);

        ch.set_position(0).unwrap();
        let mut a = [0u8; 2];
        let mut b = [0u8; 4];
        let mut dsts = [IoSliceMut::new(&mut a), IoSliceMut::new(&mut b)];
        assert_eq!(ch.read_vectored(&mut dsts).unwrap(), 6);
        assert_eq!(&a, b"fo");
        assert_eq!(&b, b"obar");
        assert_eq!(ch.position(), 6);
    }

    #[test]
    fn positional_write_is_rejected_on_append_channels() {
        let ch = channel(ChannelMode::WRITE | ChannelMode::APPEND);
        assert!(ch.write_at(0, b"x").is_err());
    }
}
