//! File-channel concurrency: position, locks, interruption, async close,
//! and byte-range advisory locks (spec §4.4).

mod asynchronous_file_channel;
mod byte_range_lock;
mod file_channel;

pub use asynchronous_file_channel::AsynchronousFileChannel;
pub use byte_range_lock::{ByteRange, ByteRangeLockTable, RangeLockGuard};
pub use file_channel::{ChannelMode, FileChannel};
