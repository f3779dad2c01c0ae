//! [`AsynchronousFileChannel`]: a thin façade that dispatches each call to
//! a worker pool and returns a future plus an optional completion
//! callback (spec §4.4, §9 "Coroutines / async"). Grounded on the
//! teacher's pervasive `tokio` stack — the one place this crate's
//! otherwise-synchronous core genuinely needs an async runtime, since the
//! spec frames this specific wrapper as "dispatch to a worker pool that
//! calls synchronous methods." Unlike the teacher's polymorphic `Vfs`
//! trait, there is exactly one async channel implementation here, so
//! these are plain inherent `async fn`s rather than an `async_trait`
//! object.

use std::sync::Arc;

use crate::error::{ErrorKind, FsError, FsResult};

use super::file_channel::FileChannel;

type Completion<T> = Box<dyn FnOnce(FsResult<T>) + Send>;

pub struct AsynchronousFileChannel {
    inner: Arc<FileChannel>,
}

impl AsynchronousFileChannel {
    pub fn new(inner: Arc<FileChannel>) -> AsynchronousFileChannel {
        AsynchronousFileChannel { inner }
    }

    fn join_error(join_err: tokio::task::JoinError) -> FsError {
        FsError::with_message(ErrorKind::Io, format!("worker task failed: {join_err}"))
    }

    /// Reads `len` bytes starting at `pos`. The close error, if any,
    /// surfaces identically to the returned future and to `callback`.
    pub async fn read(&self, pos: u64, len: usize, callback: Option<Completion<Vec<u8>>>) -> FsResult<Vec<u8>> {
        let channel = self.inner.clone();
        let result = tokio::task::spawn_blocking(move || {
            let mut buf = vec![0u8; len];
            let n = channel.read_at(pos, &mut buf)?;
            if n < 0 {
                buf.clear();
            } else {
                buf.truncate(n as usize);
            }
            Ok(buf)
        })
        .await
        .unwrap_or_else(|join_err| Err(Self::join_error(join_err)));

        if let Some(callback) = callback {
            callback(result.clone());
        }
        result
    }

    pub async fn write(&self, pos: u64, data: Vec<u8>, callback: Option<Completion<usize>>) -> FsResult<usize> {
        let channel = self.inner.clone();
        let result = tokio::task::spawn_blocking(move || channel.write_at(pos, &data))
            .await
            .unwrap_or_else(|join_err| Err(Self::join_error(join_err)));

        if let Some(callback) = callback {
            callback(result.clone());
        }
        result
    }

    pub async fn truncate(&self, new_size: u64, callback: Option<Completion<()>>) -> FsResult<()> {
        let channel = self.inner.clone();
        let result = tokio::task::spawn_blocking(move || channel.truncate(new_size))
            .await
            .unwrap_or_else(|join_err| Err(Self::join_error(join_err)));

        if let Some(callback) = callback {
            callback(result.clone());
        }
        result
    }

    pub fn size(&self) -> u64 {
        self.inner.size()
    }

    /// Closing the underlying channel closes this wrapper; any call
    /// already dispatched to the worker pool surfaces the same
    /// `Closed`/`AsynchronousClose` error through both its future and its
    /// callback, since both read from the same synchronous channel call.
    pub fn close(&self) {
        self.inner.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::file_channel::ChannelMode;
    use crate::storage::{CacheCapacity, HeapDisk, RegularFile};
    use std::sync::Mutex;

    fn async_channel() -> AsynchronousFileChannel {
        let disk = Arc::new(HeapDisk::new(4, 1 << 16, CacheCapacity::Unbounded));
        let file = Arc::new(RegularFile::new(disk));
        let channel = FileChannel::new(file, ChannelMode::READ | ChannelMode::WRITE);
        AsynchronousFileChannel::new(channel)
    }

    #[tokio::test]
    async fn write_then_read_round_trips_and_invokes_callback() {
        let channel = async_channel();
        let seen = Arc::new(Mutex::new(None));
        let seen2 = seen.clone();
        channel
            .write(0, b"hello".to_vec(), Some(Box::new(move |result| *seen2.lock().unwrap() = Some(result))))
            .await
            .unwrap();
        assert_eq!(*seen.lock().unwrap(), Some(Ok(5)));

        let data = channel.read(0, 5, None).await.unwrap();
        assert_eq!(data, b"hello");
    }

    #[tokio::test]
    async fn close_surfaces_to_subsequent_calls() {
        let channel = async_channel();
        channel.close();
        assert!(channel.read(0, 1, None).await.is_err());
    }
}
