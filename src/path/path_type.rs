//! [`PathType`]: flavor-specific parsing/rendering (spec §4.1).

use std::fmt;

use super::name::Name;
use super::normalize::PathNormalization;

/// Which real-world filesystem a [`PathType`] emulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathFlavor {
    Unix,
    Windows,
    OsX,
}

/// The outcome of splitting a raw path string into a root and names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseResult {
    pub root: Option<String>,
    pub names: Vec<String>,
}

/// Why parsing a path string failed, with the byte offset of the problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub position: usize,
    pub reason: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid path at position {}: {}", self.position, self.reason)
    }
}
impl std::error::Error for ParseError {}

const WINDOWS_RESERVED: &[char] = &['<', '>', ':', '"', '|', '?', '*'];

/// Flavor configuration: separators, root syntax, and the two
/// normalization sets applied to every parsed name.
#[derive(Debug, Clone)]
pub struct PathType {
    pub flavor: PathFlavor,
    pub separator: char,
    pub alternate_separators: Vec<char>,
    pub canonical_normalization: PathNormalization,
    pub display_normalization: PathNormalization,
}

impl PathType {
    pub fn unix() -> Self {
        PathType {
            flavor: PathFlavor::Unix,
            separator: '/',
            alternate_separators: Vec::new(),
            canonical_normalization: PathNormalization::none(),
            display_normalization: PathNormalization::none(),
        }
    }

    pub fn windows() -> Self {
        PathType {
            flavor: PathFlavor::Windows,
            separator: '\\',
            alternate_separators: vec!['/'],
            canonical_normalization: PathNormalization::case_fold_ascii(),
            display_normalization: PathNormalization::none(),
        }
    }

    pub fn os_x() -> Self {
        PathType {
            flavor: PathFlavor::OsX,
            separator: '/',
            alternate_separators: Vec::new(),
            canonical_normalization: PathNormalization::nfd() | PathNormalization::case_fold_ascii(),
            display_normalization: PathNormalization::nfc(),
        }
    }

    fn is_separator(&self, c: char) -> bool {
        c == self.separator || self.alternate_separators.contains(&c)
    }

    /// Splits `input` into a root and an ordered list of names, per spec
    /// §4.1's parsing policy.
    pub fn parse_path(&self, input: &str) -> Result<ParseResult, ParseError> {
        match self.flavor {
            PathFlavor::Unix | PathFlavor::OsX => self.parse_unix_like(input),
            PathFlavor::Windows => self.parse_windows(input),
        }
    }

    fn parse_unix_like(&self, input: &str) -> Result<ParseResult, ParseError> {
        if let Some(pos) = input.find('\0') {
            return Err(ParseError { position: pos, reason: "NUL is not allowed in a path".into() });
        }
        let root = input.starts_with(self.separator).then(|| self.separator.to_string());
        let names = input
            .split(self.separator)
            .filter(|segment| !segment.is_empty())
            .map(str::to_owned)
            .collect();
        Ok(ParseResult { root, names })
    }

    fn parse_windows(&self, input: &str) -> Result<ParseResult, ParseError> {
        if let Some(pos) = input.find('\0') {
            return Err(ParseError { position: pos, reason: "NUL is not allowed in a path".into() });
        }

        let (root, rest) = if input.starts_with("\\\\") || input.starts_with("//") {
            self.parse_unc_root(input)?
        } else if let Some(root) = self.parse_drive_root(input)? {
            root
        } else {
            (None, input)
        };

        let names: Vec<String> = rest
            .split(|c: char| self.is_separator(c))
            .filter(|segment| !segment.is_empty())
            .map(str::to_owned)
            .collect();

        for name in &names {
            self.validate_windows_name(name, input)?;
        }

        Ok(ParseResult { root, names })
    }

    fn parse_drive_root<'a>(&self, input: &'a str) -> Result<Option<(Option<String>, &'a str)>, ParseError> {
        let mut chars = input.chars();
        let Some(letter) = chars.next() else { return Ok(None) };
        if !letter.is_ascii_alphabetic() {
            return Ok(None);
        }
        let rest = chars.as_str();
        if !rest.starts_with(':') {
            return Ok(None);
        }
        let after_colon = &rest[1..];
        if !after_colon.starts_with(|c| self.is_separator(c)) {
            return Err(ParseError {
                position: 2,
                reason: "drive-relative paths (e.g. \"C:foo\") are not supported".into(),
            });
        }
        let root = format!("{}:{}", letter.to_ascii_uppercase(), self.separator);
        Ok(Some((Some(root), &after_colon[1..])))
    }

    fn parse_unc_root<'a>(&self, input: &'a str) -> Result<(Option<String>, &'a str), ParseError> {
        let body = &input[2..];
        let mut parts = body.splitn(3, |c: char| self.is_separator(c));
        let host = parts.next().unwrap_or("");
        if host.is_empty() {
            return Err(ParseError { position: 2, reason: "UNC path is missing a host name".into() });
        }
        let share = parts.next().unwrap_or("");
        if share.is_empty() {
            return Err(ParseError {
                position: 2 + host.len() + 1,
                reason: "UNC path is missing a share name".into(),
            });
        }
        let rest = parts.next().unwrap_or("");
        let root = format!("\\\\{host}\\{share}\\");
        Ok((Some(root), rest))
    }

    fn validate_windows_name(&self, name: &str, full: &str) -> Result<(), ParseError> {
        if let Some(bad) = name.chars().find(|c| WINDOWS_RESERVED.contains(c)) {
            let position = full.find(name).unwrap_or(0);
            return Err(ParseError {
                position,
                reason: format!("reserved character '{bad}' is not allowed in a name"),
            });
        }
        if name.ends_with(' ') {
            let position = full.find(name).unwrap_or(0);
            return Err(ParseError { position, reason: "trailing spaces are not allowed in a name".into() });
        }
        Ok(())
    }

    /// Renders `root` + `names` back to a flavor-specific string.
    pub fn to_string(&self, root: Option<&str>, names: &[Name]) -> String {
        let mut out = String::new();
        if let Some(root) = root {
            out.push_str(root);
        }
        let joined = names.iter().map(Name::display).collect::<Vec<_>>().join(&self.separator.to_string());
        out.push_str(&joined);
        out
    }

    pub fn name(&self, raw: &str) -> Name {
        Name::create(raw, self.canonical_normalization, self.display_normalization)
    }
}
