//! Block-allocated regular file storage (spec §3, §4.3).

mod heap_disk;
mod regular_file;

pub use heap_disk::{CacheCapacity, HeapDisk};
pub use regular_file::RegularFile;

/// A fixed-size, zero-filled byte buffer. `HeapDisk` hands these out and
/// reclaims them; `RegularFile` stores content as an ordered list of them.
pub type Block = Box<[u8]>;
