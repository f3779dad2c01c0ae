//! [`JimfsInputStream`]/[`JimfsOutputStream`]: `std::io::Read`/`Write`
//! adapters over a [`FileChannel`] (spec §4.4, "byte-stream views"). Thin
//! wrappers in the same spirit as the teacher's `StreamWriter` framing a
//! socket as a byte sink — here framing a channel instead.

use std::io;
use std::sync::Arc;

use crate::channel::FileChannel;

fn io_error(err: crate::error::FsError) -> io::Error {
    io::Error::other(err.to_string())
}

pub struct JimfsInputStream {
    channel: Arc<FileChannel>,
}

impl JimfsInputStream {
    pub fn new(channel: Arc<FileChannel>) -> JimfsInputStream {
        JimfsInputStream { channel }
    }

    pub fn close(&self) {
        self.channel.close();
    }
}

impl io::Read for JimfsInputStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.channel.read(buf).map_err(io_error)? {
            -1 => Ok(0),
            n => Ok(n as usize),
        }
    }
}

pub struct JimfsOutputStream {
    channel: Arc<FileChannel>,
}

impl JimfsOutputStream {
    pub fn new(channel: Arc<FileChannel>) -> JimfsOutputStream {
        JimfsOutputStream { channel }
    }

    pub fn close(&self) {
        self.channel.close();
    }
}

impl io::Write for JimfsOutputStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.channel.write(buf).map_err(io_error)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::ChannelMode;
    use crate::storage::{CacheCapacity, HeapDisk, RegularFile};
    use std::io::{Read, Write};

    fn channel(mode: ChannelMode) -> Arc<FileChannel> {
        let disk = Arc::new(HeapDisk::new(8, 1 << 16, CacheCapacity::Unbounded));
        let file = Arc::new(RegularFile::new(disk));
        FileChannel::new(file, mode)
    }

    #[test]
    fn output_then_input_round_trips() {
        let ch = channel(ChannelMode::READ | ChannelMode::WRITE);
        let mut out = JimfsOutputStream::new(ch.clone());
        out.write_all(b"hello").unwrap();
        ch.set_position(0).unwrap();
        let mut input = JimfsInputStream::new(ch);
        let mut buf = String::new();
        input.read_to_string(&mut buf).unwrap();
        assert_eq!(buf, "hello");
    }

    #[test]
    fn read_at_eof_returns_zero_not_error() {
        let ch = channel(ChannelMode::READ);
        let mut input = JimfsInputStream::new(ch);
        let mut buf = [0u8; 4];
        assert_eq!(input.read(&mut buf).unwrap(), 0);
    }
}
