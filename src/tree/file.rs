//! [`File`]: the tagged union of directory/regular-file/symlink with the
//! common header spec §3 and §9 describe — "avoid deep inheritance,
//! dispatch at the few boundaries that actually differ." Grounded on
//! `examples/in_memory/filesystem.rs`'s `Entry { attr, kind: EntryKind }`
//! shape (a plain header struct plus a kind enum), generalized from NFS
//! attributes to this crate's attribute-view map.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::path::JimfsPath;
use crate::storage::RegularFile;

use super::directory::Directory;

/// A value stored under one `"view:name"` attribute key. Mirrors the
/// handful of concrete shapes the providers in `attr/` need.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Bool(bool),
    U32(u32),
    U64(u64),
    I64(i64),
    Time(SystemTime),
    Text(String),
    Bytes(Vec<u8>),
    StringList(Vec<String>),
}

/// `serde` has no native `SystemTime` support, so `Time` round-trips as
/// nanoseconds since the Unix epoch — sufficient for config files, which
/// only ever set default attribute values, never real timestamps.
#[derive(Serialize, Deserialize)]
enum SerdeAttributeValue {
    Bool(bool),
    U32(u32),
    U64(u64),
    I64(i64),
    TimeNanosSinceEpoch(u64),
    Text(String),
    Bytes(Vec<u8>),
    StringList(Vec<String>),
}

impl From<&AttributeValue> for SerdeAttributeValue {
    fn from(value: &AttributeValue) -> Self {
        match value {
            AttributeValue::Bool(b) => SerdeAttributeValue::Bool(*b),
            AttributeValue::U32(n) => SerdeAttributeValue::U32(*n),
            AttributeValue::U64(n) => SerdeAttributeValue::U64(*n),
            AttributeValue::I64(n) => SerdeAttributeValue::I64(*n),
            AttributeValue::Time(t) => SerdeAttributeValue::TimeNanosSinceEpoch(
                t.duration_since(UNIX_EPOCH).unwrap_or_default().as_nanos() as u64,
            ),
            AttributeValue::Text(s) => SerdeAttributeValue::Text(s.clone()),
            AttributeValue::Bytes(b) => SerdeAttributeValue::Bytes(b.clone()),
            AttributeValue::StringList(v) => SerdeAttributeValue::StringList(v.clone()),
        }
    }
}

impl From<SerdeAttributeValue> for AttributeValue {
    fn from(value: SerdeAttributeValue) -> Self {
        match value {
            SerdeAttributeValue::Bool(b) => AttributeValue::Bool(b),
            SerdeAttributeValue::U32(n) => AttributeValue::U32(n),
            SerdeAttributeValue::U64(n) => AttributeValue::U64(n),
            SerdeAttributeValue::I64(n) => AttributeValue::I64(n),
            SerdeAttributeValue::TimeNanosSinceEpoch(nanos) => {
                AttributeValue::Time(UNIX_EPOCH + Duration::from_nanos(nanos))
            }
            SerdeAttributeValue::Text(s) => AttributeValue::Text(s),
            SerdeAttributeValue::Bytes(b) => AttributeValue::Bytes(b),
            SerdeAttributeValue::StringList(v) => AttributeValue::StringList(v),
        }
    }
}

impl Serialize for AttributeValue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        SerdeAttributeValue::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AttributeValue {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        SerdeAttributeValue::deserialize(deserializer).map(AttributeValue::from)
    }
}

/// The three kinds of node this crate's tree can hold.
pub enum FileKind {
    Directory(Directory),
    RegularFile(Arc<RegularFile>),
    SymbolicLink(JimfsPath),
}

struct Header {
    kind: FileKind,
    attributes: HashMap<String, AttributeValue>,
    creation_time: SystemTime,
    last_modified_time: SystemTime,
    last_access_time: SystemTime,
    link_count: u32,
}

/// A node in the file tree: stable `id`, a kind, an attribute map, times,
/// and a link count. Always held behind `Arc` since hard links and open
/// file handles outlive any single directory entry.
pub struct File {
    id: u64,
    header: Mutex<Header>,
}

fn next_file_id() -> u64 {
    static NEXT: AtomicU64 = AtomicU64::new(1);
    NEXT.fetch_add(1, Ordering::Relaxed)
}

impl File {
    pub fn new(kind: FileKind) -> Arc<File> {
        let now = SystemTime::now();
        Arc::new(File {
            id: next_file_id(),
            header: Mutex::new(Header {
                kind,
                attributes: HashMap::new(),
                creation_time: now,
                last_modified_time: now,
                last_access_time: now,
                link_count: 0,
            }),
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_directory(&self) -> bool {
        matches!(self.header.lock().unwrap().kind, FileKind::Directory(_))
    }

    pub fn is_regular_file(&self) -> bool {
        matches!(self.header.lock().unwrap().kind, FileKind::RegularFile(_))
    }

    pub fn is_symbolic_link(&self) -> bool {
        matches!(self.header.lock().unwrap().kind, FileKind::SymbolicLink(_))
    }

    pub fn with_directory<R>(&self, f: impl FnOnce(&Directory) -> R) -> Option<R> {
        match &self.header.lock().unwrap().kind {
            FileKind::Directory(dir) => Some(f(dir)),
            _ => None,
        }
    }

    pub fn with_directory_mut<R>(&self, f: impl FnOnce(&mut Directory) -> R) -> Option<R> {
        match &mut self.header.lock().unwrap().kind {
            FileKind::Directory(dir) => Some(f(dir)),
            _ => None,
        }
    }

    pub fn regular_file(&self) -> Option<Arc<RegularFile>> {
        match &self.header.lock().unwrap().kind {
            FileKind::RegularFile(rf) => Some(rf.clone()),
            _ => None,
        }
    }

    pub fn symbolic_link_target(&self) -> Option<JimfsPath> {
        match &self.header.lock().unwrap().kind {
            FileKind::SymbolicLink(target) => Some(target.clone()),
            _ => None,
        }
    }

    pub fn link_count(&self) -> u32 {
        self.header.lock().unwrap().link_count
    }

    pub fn increment_link_count(&self) {
        self.header.lock().unwrap().link_count += 1;
    }

    /// Returns the link count after decrementing, so callers can decide
    /// whether to free the file's storage.
    pub fn decrement_link_count(&self) -> u32 {
        let mut header = self.header.lock().unwrap();
        header.link_count = header.link_count.saturating_sub(1);
        header.link_count
    }

    pub fn creation_time(&self) -> SystemTime {
        self.header.lock().unwrap().creation_time
    }

    pub fn last_modified_time(&self) -> SystemTime {
        self.header.lock().unwrap().last_modified_time
    }

    pub fn last_access_time(&self) -> SystemTime {
        self.header.lock().unwrap().last_access_time
    }

    pub fn set_creation_time(&self, time: SystemTime) {
        self.header.lock().unwrap().creation_time = time;
    }

    pub fn set_last_modified_time(&self, time: SystemTime) {
        self.header.lock().unwrap().last_modified_time = time;
    }

    pub fn set_last_access_time(&self, time: SystemTime) {
        self.header.lock().unwrap().last_access_time = time;
    }

    pub fn touch_modified_now(&self) {
        self.set_last_modified_time(SystemTime::now());
    }

    pub fn get_attribute(&self, key: &str) -> Option<AttributeValue> {
        self.header.lock().unwrap().attributes.get(key).cloned()
    }

    pub fn set_attribute(&self, key: impl Into<String>, value: AttributeValue) {
        self.header.lock().unwrap().attributes.insert(key.into(), value);
    }

    pub fn remove_attribute(&self, key: &str) -> Option<AttributeValue> {
        self.header.lock().unwrap().attributes.remove(key)
    }

    /// All attribute keys whose `"view:"` prefix matches `view`.
    pub fn attribute_keys_for_view(&self, view: &str) -> Vec<String> {
        let prefix = format!("{view}:");
        self.header.lock().unwrap().attributes.keys().filter(|k| k.starts_with(&prefix)).cloned().collect()
    }

    pub fn size(&self) -> u64 {
        match &self.header.lock().unwrap().kind {
            FileKind::RegularFile(rf) => rf.size(),
            _ => 0,
        }
    }
}

impl std::fmt::Debug for File {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("File").field("id", &self.id).finish_non_exhaustive()
    }
}
