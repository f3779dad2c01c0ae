//! URI round-tripping for a `JimfsPath` (spec §6).
//!
//! `scheme://name/path`, percent-escaped, `name` identifying the owning
//! filesystem instance.

use std::fmt;
use std::sync::Arc;

use super::jimfs_path::JimfsPath;
use super::path_type::PathType;

pub const SCHEME: &str = "memfs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriError(pub String);

impl fmt::Display for UriError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid filesystem URI: {}", self.0)
    }
}
impl std::error::Error for UriError {}

fn percent_encode(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

fn percent_decode(raw: &str) -> Result<String, UriError> {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = raw
                .get(i + 1..i + 3)
                .ok_or_else(|| UriError("truncated percent escape".into()))?;
            let value = u8::from_str_radix(hex, 16)
                .map_err(|_| UriError(format!("invalid percent escape '%{hex}'")))?;
            out.push(value);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).map_err(|_| UriError("percent-decoded path is not valid UTF-8".into()))
}

/// `scheme://name/...path...`, trailing `/` significant for directories.
pub fn to_uri(name: &str, path: &JimfsPath, is_directory: bool) -> String {
    let root_and_names = path.path_type().to_string(path.root(), path.names());
    let normalized_slashes = root_and_names.replace(path.path_type().separator, "/");
    let mut body = normalized_slashes.trim_start_matches('/').to_string();
    if is_directory && !body.ends_with('/') && !body.is_empty() {
        body.push('/');
    }
    format!("{SCHEME}://{name}/{}", percent_encode(&body))
}

/// Parses a URI produced by [`to_uri`] back into `(name, path_string, is_directory)`.
pub fn from_uri(uri: &str) -> Result<(String, String, bool), UriError> {
    let rest = uri
        .strip_prefix(&format!("{SCHEME}://"))
        .ok_or_else(|| UriError(format!("expected scheme '{SCHEME}://'")))?;
    let slash = rest.find('/').ok_or_else(|| UriError("missing path after filesystem name".into()))?;
    let (name, path_part) = rest.split_at(slash);
    if name.is_empty() {
        return Err(UriError("missing filesystem name".into()));
    }
    let decoded = percent_decode(&path_part[1..])?;
    let is_directory = decoded.ends_with('/') || decoded.is_empty();
    Ok((name.to_owned(), format!("/{decoded}"), is_directory))
}

/// Convenience: parses a decoded URI path string back into a [`JimfsPath`].
pub fn parse_uri_path(path_type: Arc<PathType>, uri_path: &str) -> Result<JimfsPath, super::path_type::ParseError> {
    let native = if path_type.separator != '/' {
        uri_path.replace('/', &path_type.separator.to_string())
    } else {
        uri_path.to_owned()
    };
    JimfsPath::parse(path_type, &native)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unix_round_trip() {
        let pt = Arc::new(PathType::unix());
        let path = JimfsPath::parse(pt.clone(), "/foo/bar").unwrap();
        let uri = to_uri("myfs", &path, false);
        assert_eq!(uri, "memfs://myfs/foo/bar");
        let (name, path_str, is_dir) = from_uri(&uri).unwrap();
        assert_eq!(name, "myfs");
        assert!(!is_dir);
        let round_tripped = parse_uri_path(pt, &path_str).unwrap();
        assert_eq!(round_tripped, path);
    }

    #[test]
    fn windows_unc_round_trip() {
        let pt = Arc::new(PathType::windows());
        let path = JimfsPath::parse(pt.clone(), "\\\\host\\share\\foo").unwrap();
        let uri = to_uri("myfs", &path, false);
        assert_eq!(uri, "memfs://myfs//host/share/foo");
        let (_, path_str, _) = from_uri(&uri).unwrap();
        let round_tripped = parse_uri_path(pt, &path_str).unwrap();
        assert_eq!(round_tripped, path);
    }

    #[test]
    fn trailing_slash_round_trips_directory_flag() {
        let pt = Arc::new(PathType::unix());
        let path = JimfsPath::parse(pt, "/foo/bar").unwrap();
        let uri = to_uri("myfs", &path, true);
        assert!(uri.ends_with('/'));
        let (_, _, is_dir) = from_uri(&uri).unwrap();
        assert!(is_dir);
    }
}
