//! [`Name`]: a display/canonical string pair (spec §3).

use std::fmt;
use std::hash::{Hash, Hasher};

use super::normalize::PathNormalization;

/// A path component name. Equality and hashing use `canonical` only;
/// `Display` renders `display`.
#[derive(Debug, Clone)]
pub struct Name {
    display: String,
    canonical: String,
}

impl Name {
    /// The `.` sentinel.
    pub fn self_name() -> Name {
        Name { display: ".".to_owned(), canonical: ".".to_owned() }
    }

    /// The `..` sentinel.
    pub fn parent_name() -> Name {
        Name { display: "..".to_owned(), canonical: "..".to_owned() }
    }

    /// Builds a `Name` by separately normalizing the display and canonical
    /// forms of `raw`.
    pub fn create(raw: &str, canonical_norm: PathNormalization, display_norm: PathNormalization) -> Name {
        Name { display: display_norm.normalize(raw), canonical: canonical_norm.normalize(raw) }
    }

    pub fn display(&self) -> &str {
        &self.display
    }

    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    pub fn is_self(&self) -> bool {
        self.canonical == "."
    }

    pub fn is_parent(&self) -> bool {
        self.canonical == ".."
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}
impl Eq for Name {}

impl Hash for Name {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_uses_canonical_form() {
        let a = Name::create("FOO", PathNormalization::case_fold_ascii(), PathNormalization::none());
        let b = Name::create("foo", PathNormalization::case_fold_ascii(), PathNormalization::none());
        assert_eq!(a, b);
        assert_eq!(a.display(), "FOO");
        assert_eq!(b.display(), "foo");
    }

    #[test]
    fn sentinels_are_self_and_parent() {
        assert!(Name::self_name().is_self());
        assert!(Name::parent_name().is_parent());
        assert!(!Name::self_name().is_parent());
    }
}
