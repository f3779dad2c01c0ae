//! Polling watch service (spec §4.6): periodic directory-snapshot diffing
//! producing CREATE/MODIFY/DELETE events. Grounded on `src/read_task.rs`'s
//! background-thread-plus-channel shape, with a `HashMap` diff loop in
//! place of socket reads.

mod key;
mod polling_watch_service;

pub use key::{Event, EventKind, WatchKey};
pub use polling_watch_service::PollingWatchService;
