//! [`JimfsPath`]: the public path value type (spec §3, §4.1 "JimfsPath").

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use super::name::Name;
use super::path_type::PathType;

/// An absolute or relative path within one filesystem. Empty (no root, no
/// names) represents "the working directory" when resolved.
#[derive(Clone)]
pub struct JimfsPath {
    path_type: Arc<PathType>,
    root: Option<String>,
    names: Vec<Name>,
}

impl JimfsPath {
    pub fn new(path_type: Arc<PathType>, root: Option<String>, names: Vec<Name>) -> Self {
        JimfsPath { path_type, root, names }
    }

    pub fn parse(path_type: Arc<PathType>, raw: &str) -> Result<Self, super::path_type::ParseError> {
        let parsed = path_type.parse_path(raw)?;
        let names = parsed.names.iter().map(|n| path_type.name(n)).collect();
        Ok(JimfsPath { path_type, root: parsed.root, names })
    }

    pub fn is_absolute(&self) -> bool {
        self.root.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none() && self.names.is_empty()
    }

    pub fn root(&self) -> Option<&str> {
        self.root.as_deref()
    }

    pub fn names(&self) -> &[Name] {
        &self.names
    }

    pub fn file_name(&self) -> Option<&Name> {
        self.names.last()
    }

    pub fn parent(&self) -> Option<JimfsPath> {
        if self.names.is_empty() {
            return None;
        }
        Some(JimfsPath {
            path_type: self.path_type.clone(),
            root: self.root.clone(),
            names: self.names[..self.names.len() - 1].to_vec(),
        })
    }

    /// `p.resolve(other)`: if `other` is absolute, it replaces `self`;
    /// otherwise its names are appended.
    pub fn resolve(&self, other: &JimfsPath) -> JimfsPath {
        if other.is_absolute() || other.is_empty() && self.is_empty() {
            return other.clone();
        }
        if other.is_empty() {
            return self.clone();
        }
        let mut names = self.names.clone();
        names.extend(other.names.iter().cloned());
        JimfsPath { path_type: self.path_type.clone(), root: self.root.clone(), names }
    }

    /// `self.relativize(other)`: `self.resolve(result) == other`, for two
    /// paths with matching roots (or both relative) and no `..`/`.`.
    pub fn relativize(&self, other: &JimfsPath) -> Result<JimfsPath, &'static str> {
        if self.is_absolute() != other.is_absolute() {
            return Err("cannot relativize an absolute path against a relative one, or vice versa");
        }
        if self.root != other.root {
            return Err("paths do not share a root");
        }
        let common = self.names.iter().zip(other.names.iter()).take_while(|(a, b)| a == b).count();
        let mut names = vec![Name::parent_name(); self.names.len() - common];
        names.extend(other.names[common..].iter().cloned());
        Ok(JimfsPath { path_type: self.path_type.clone(), root: None, names })
    }

    pub fn subpath(&self, begin: usize, end: usize) -> JimfsPath {
        JimfsPath {
            path_type: self.path_type.clone(),
            root: None,
            names: self.names[begin..end].to_vec(),
        }
    }

    pub fn starts_with(&self, other: &JimfsPath) -> bool {
        if self.root != other.root {
            return false;
        }
        other.names.len() <= self.names.len() && self.names[..other.names.len()] == other.names[..]
    }

    pub fn ends_with(&self, other: &JimfsPath) -> bool {
        if other.is_absolute() {
            return self.root == other.root && self.names == other.names;
        }
        other.names.len() <= self.names.len()
            && self.names[self.names.len() - other.names.len()..] == other.names[..]
    }

    /// True iff the path has no `.` or `..` components left to collapse.
    pub fn is_normalized(&self) -> bool {
        self.names.iter().all(|n| !n.is_self() && !n.is_parent())
    }

    /// Collapses `.` and resolvable `..` segments, mirroring POSIX
    /// lexical normalization (it does not consult the filesystem).
    pub fn normalize(&self) -> JimfsPath {
        let mut result: Vec<Name> = Vec::with_capacity(self.names.len());
        for name in &self.names {
            if name.is_self() {
                continue;
            }
            if name.is_parent() {
                match result.last() {
                    Some(last) if !last.is_parent() => {
                        result.pop();
                    }
                    _ if self.root.is_none() => result.push(Name::parent_name()),
                    _ => {}
                }
                continue;
            }
            result.push(name.clone());
        }
        JimfsPath { path_type: self.path_type.clone(), root: self.root.clone(), names: result }
    }

    pub fn path_type(&self) -> &Arc<PathType> {
        &self.path_type
    }
}

impl PartialEq for JimfsPath {
    fn eq(&self, other: &Self) -> bool {
        self.root == other.root && self.names == other.names
    }
}
impl Eq for JimfsPath {}

impl PartialOrd for JimfsPath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for JimfsPath {
    fn cmp(&self, other: &Self) -> Ordering {
        let root_cmp = self.root.as_deref().unwrap_or("").cmp(other.root.as_deref().unwrap_or(""));
        if root_cmp != Ordering::Equal {
            return root_cmp;
        }
        self.names
            .iter()
            .map(Name::canonical)
            .cmp(other.names.iter().map(Name::canonical))
    }
}

impl fmt::Display for JimfsPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path_type.to_string(self.root.as_deref(), &self.names))
    }
}

impl fmt::Debug for JimfsPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JimfsPath({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn unix() -> Arc<PathType> {
        Arc::new(PathType::unix())
    }

    fn path(raw: &str) -> JimfsPath {
        JimfsPath::parse(unix(), raw).unwrap()
    }

    #[test]
    fn normalize_is_identity_iff_no_dot_segments() {
        assert!(path("/foo/bar").normalize() == path("/foo/bar"));
        assert_ne!(path("/foo/./bar"), path("/foo/./bar").normalize());
        assert_eq!(path("/foo/./bar").normalize(), path("/foo/bar"));
        assert_eq!(path("/foo/baz/../bar").normalize(), path("/foo/bar"));
    }

    #[test]
    fn relativize_then_resolve_round_trips() {
        let base = path("/foo");
        let target = path("/foo/bar/baz");
        let rel = base.relativize(&target).unwrap();
        assert!(!rel.is_absolute());
        assert_eq!(base.resolve(&rel), target);
    }

    #[test]
    fn starts_with_and_ends_with() {
        let p = path("/foo/bar/baz");
        assert!(p.starts_with(&path("/foo/bar")));
        assert!(p.ends_with(&path("bar/baz")));
        assert!(!p.ends_with(&path("/bar/baz")));
    }

    #[test]
    fn ordering_is_lexicographic_on_canonical_names() {
        assert!(path("/a") < path("/b"));
        assert!(path("/a/b") < path("/a/c"));
    }
}
