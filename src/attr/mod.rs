//! Attribute views over [`crate::tree::File`] (spec §4.5): a small set of
//! named views (`basic`, `owner`, `posix`, `unix`, `dos`, `acl`, `user`),
//! each a [`Provider`] that knows its own attribute names and the views it
//! depends on. Grounded on the teacher's `apply_setattr`-style composition
//! (absent a direct analogue in this pack, modeled after
//! `examples/shadow_fs/fs/utils.rs`'s layered attribute application) —
//! generalized here into a declared-dependency provider registry instead
//! of one hardcoded function.

mod providers;
mod service;
mod view;

pub use service::AttributeService;
pub use view::AttributeView;

pub use crate::tree::AttributeValue;

use std::collections::HashMap;

use crate::tree::File;

/// One named attribute view: a fixed set of attribute names, the views it
/// reads from when composing defaults, and how to read/write its own
/// attributes on a [`File`].
pub trait Provider: Send + Sync {
    fn view_name(&self) -> &'static str;

    /// Other views whose providers must also be enabled whenever this one
    /// is (e.g. `unix` depends on `basic`, `owner`, `posix`).
    fn inherits(&self) -> &'static [&'static str] {
        &[]
    }

    /// The fixed attribute names this view defines. Empty for `user`,
    /// whose attribute names are caller-supplied.
    fn attribute_names(&self) -> &'static [&'static str];

    /// Values to seed on a freshly created file, before any caller
    /// overrides are applied.
    fn default_values(&self, user_defaults: &HashMap<String, AttributeValue>) -> HashMap<String, AttributeValue>;

    fn get(&self, file: &File, name: &str) -> Option<AttributeValue>;

    fn set(&self, file: &File, name: &str, value: AttributeValue, on_create: bool) -> crate::error::FsResult<()>;
}
