//! The concrete views. Each is a small, mostly declarative schema table;
//! unlike the teacher's per-RPC-operation files (each with genuinely
//! distinct logic), these are uniform enough to live together.

use std::collections::HashMap;

use crate::error::{ErrorKind, FsError, FsResult};
use crate::tree::File;

use super::{AttributeValue, Provider};

fn unsupported(view: &str, name: &str) -> FsError {
    FsError::with_message(ErrorKind::Unsupported, format!("'{view}:{name}' is not settable"))
}

fn type_mismatch(view: &str, name: &str) -> FsError {
    FsError::with_message(ErrorKind::InvalidArgument, format!("wrong value type for '{view}:{name}'"))
}

/// `fileKey`, `size`, `is*`, and the three timestamps. Mirrors
/// `java.nio.file.attribute.BasicFileAttributeView`.
pub struct BasicProvider;

impl Provider for BasicProvider {
    fn view_name(&self) -> &'static str {
        "basic"
    }

    fn attribute_names(&self) -> &'static [&'static str] {
        &[
            "fileKey",
            "size",
            "isDirectory",
            "isRegularFile",
            "isSymbolicLink",
            "isOther",
            "creationTime",
            "lastModifiedTime",
            "lastAccessTime",
        ]
    }

    fn default_values(&self, _user_defaults: &HashMap<String, AttributeValue>) -> HashMap<String, AttributeValue> {
        // Every basic attribute is computed live from the file itself;
        // nothing needs to be seeded into its attribute map.
        HashMap::new()
    }

    fn get(&self, file: &File, name: &str) -> Option<AttributeValue> {
        match name {
            "fileKey" => Some(AttributeValue::U64(file.id())),
            "size" => Some(AttributeValue::U64(file.size())),
            "isDirectory" => Some(AttributeValue::Bool(file.is_directory())),
            "isRegularFile" => Some(AttributeValue::Bool(file.is_regular_file())),
            "isSymbolicLink" => Some(AttributeValue::Bool(file.is_symbolic_link())),
            "isOther" => Some(AttributeValue::Bool(false)),
            "creationTime" => Some(AttributeValue::Time(file.creation_time())),
            "lastModifiedTime" => Some(AttributeValue::Time(file.last_modified_time())),
            "lastAccessTime" => Some(AttributeValue::Time(file.last_access_time())),
            _ => None,
        }
    }

    fn set(&self, file: &File, name: &str, value: AttributeValue, _on_create: bool) -> FsResult<()> {
        let time = match value {
            AttributeValue::Time(t) => t,
            _ => return Err(type_mismatch("basic", name)),
        };
        match name {
            "creationTime" => file.set_creation_time(time),
            "lastModifiedTime" => file.set_last_modified_time(time),
            "lastAccessTime" => file.set_last_access_time(time),
            _ => return Err(unsupported("basic", name)),
        }
        Ok(())
    }
}

/// `owner`: a single opaque principal name.
pub struct OwnerProvider;

impl Provider for OwnerProvider {
    fn view_name(&self) -> &'static str {
        "owner"
    }

    fn attribute_names(&self) -> &'static [&'static str] {
        &["owner"]
    }

    fn default_values(&self, user_defaults: &HashMap<String, AttributeValue>) -> HashMap<String, AttributeValue> {
        let owner = user_defaults.get("owner:owner").cloned().unwrap_or_else(|| AttributeValue::Text("nobody".into()));
        HashMap::from([("owner".to_string(), owner)])
    }

    fn get(&self, file: &File, name: &str) -> Option<AttributeValue> {
        (name == "owner").then(|| file.get_attribute("owner:owner")).flatten()
    }

    fn set(&self, file: &File, name: &str, value: AttributeValue, _on_create: bool) -> FsResult<()> {
        if name != "owner" {
            return Err(unsupported("owner", name));
        }
        if !matches!(value, AttributeValue::Text(_)) {
            return Err(type_mismatch("owner", name));
        }
        file.set_attribute("owner:owner", value);
        Ok(())
    }
}

/// `posix`: permissions string plus a group principal, inheriting
/// `basic`/`owner`.
pub struct PosixProvider;

impl Provider for PosixProvider {
    fn view_name(&self) -> &'static str {
        "posix"
    }

    fn inherits(&self) -> &'static [&'static str] {
        &["basic", "owner"]
    }

    fn attribute_names(&self) -> &'static [&'static str] {
        &["permissions", "group"]
    }

    fn default_values(&self, user_defaults: &HashMap<String, AttributeValue>) -> HashMap<String, AttributeValue> {
        let permissions = user_defaults
            .get("posix:permissions")
            .cloned()
            .unwrap_or_else(|| AttributeValue::Text("rw-r--r--".into()));
        let group = user_defaults.get("posix:group").cloned().unwrap_or_else(|| AttributeValue::Text("nobody".into()));
        HashMap::from([("permissions".to_string(), permissions), ("group".to_string(), group)])
    }

    fn get(&self, file: &File, name: &str) -> Option<AttributeValue> {
        match name {
            "permissions" => file.get_attribute("posix:permissions"),
            "group" => file.get_attribute("posix:group"),
            _ => None,
        }
    }

    fn set(&self, file: &File, name: &str, value: AttributeValue, _on_create: bool) -> FsResult<()> {
        match name {
            "permissions" => {
                if !matches!(value, AttributeValue::Text(_)) {
                    return Err(type_mismatch("posix", name));
                }
                file.set_attribute("posix:permissions", value);
            }
            "group" => {
                if !matches!(value, AttributeValue::Text(_)) {
                    return Err(type_mismatch("posix", name));
                }
                file.set_attribute("posix:group", value);
            }
            _ => return Err(unsupported("posix", name)),
        }
        Ok(())
    }
}

fn parse_permissions(text: &str) -> u32 {
    let mut mode = 0u32;
    for (i, c) in text.chars().enumerate().take(9) {
        if c != '-' {
            mode |= 1 << (8 - i);
        }
    }
    mode
}

/// `unix`: read-only, derived entirely from `basic`/`owner`/`posix`.
pub struct UnixProvider;

impl Provider for UnixProvider {
    fn view_name(&self) -> &'static str {
        "unix"
    }

    fn inherits(&self) -> &'static [&'static str] {
        &["basic", "owner", "posix"]
    }

    fn attribute_names(&self) -> &'static [&'static str] {
        &["uid", "gid", "dev", "rdev", "ino", "mode", "ctime", "nlink"]
    }

    fn default_values(&self, _user_defaults: &HashMap<String, AttributeValue>) -> HashMap<String, AttributeValue> {
        HashMap::new()
    }

    fn get(&self, file: &File, name: &str) -> Option<AttributeValue> {
        match name {
            "uid" | "gid" => Some(AttributeValue::U32(0)),
            "dev" | "rdev" => Some(AttributeValue::U64(0)),
            "ino" => Some(AttributeValue::U64(file.id())),
            "ctime" => Some(AttributeValue::Time(file.last_modified_time())),
            "nlink" => Some(AttributeValue::U32(file.link_count())),
            "mode" => {
                let permissions = match file.get_attribute("posix:permissions") {
                    Some(AttributeValue::Text(text)) => parse_permissions(&text),
                    _ => 0,
                };
                let type_bits = if file.is_directory() { 0o040000 } else if file.is_symbolic_link() { 0o120000 } else { 0o100000 };
                Some(AttributeValue::U32(type_bits | permissions))
            }
            _ => None,
        }
    }

    fn set(&self, _file: &File, name: &str, _value: AttributeValue, _on_create: bool) -> FsResult<()> {
        Err(unsupported("unix", name))
    }
}

/// `dos`: four independent booleans.
pub struct DosProvider;

impl Provider for DosProvider {
    fn view_name(&self) -> &'static str {
        "dos"
    }

    fn inherits(&self) -> &'static [&'static str] {
        &["basic"]
    }

    fn attribute_names(&self) -> &'static [&'static str] {
        &["readonly", "hidden", "archive", "system"]
    }

    fn default_values(&self, user_defaults: &HashMap<String, AttributeValue>) -> HashMap<String, AttributeValue> {
        self.attribute_names()
            .iter()
            .map(|&name| {
                let key = format!("dos:{name}");
                let value = user_defaults.get(&key).cloned().unwrap_or(AttributeValue::Bool(false));
                (name.to_string(), value)
            })
            .collect()
    }

    fn get(&self, file: &File, name: &str) -> Option<AttributeValue> {
        if !self.attribute_names().contains(&name) {
            return None;
        }
        file.get_attribute(&format!("dos:{name}")).or(Some(AttributeValue::Bool(false)))
    }

    fn set(&self, file: &File, name: &str, value: AttributeValue, _on_create: bool) -> FsResult<()> {
        if !self.attribute_names().contains(&name) {
            return Err(unsupported("dos", name));
        }
        if !matches!(value, AttributeValue::Bool(_)) {
            return Err(type_mismatch("dos", name));
        }
        file.set_attribute(format!("dos:{name}"), value);
        Ok(())
    }
}

/// `acl`: a single opaque ACL blob, stored and returned verbatim.
pub struct AclProvider;

impl Provider for AclProvider {
    fn view_name(&self) -> &'static str {
        "acl"
    }

    fn inherits(&self) -> &'static [&'static str] {
        &["owner"]
    }

    fn attribute_names(&self) -> &'static [&'static str] {
        &["acl"]
    }

    fn default_values(&self, _user_defaults: &HashMap<String, AttributeValue>) -> HashMap<String, AttributeValue> {
        HashMap::from([("acl".to_string(), AttributeValue::Bytes(Vec::new()))])
    }

    fn get(&self, file: &File, name: &str) -> Option<AttributeValue> {
        (name == "acl").then(|| file.get_attribute("acl:acl")).flatten()
    }

    fn set(&self, file: &File, name: &str, value: AttributeValue, _on_create: bool) -> FsResult<()> {
        if name != "acl" {
            return Err(unsupported("acl", name));
        }
        if !matches!(value, AttributeValue::Bytes(_)) {
            return Err(type_mismatch("acl", name));
        }
        file.set_attribute("acl:acl", value);
        Ok(())
    }
}

/// `user`: arbitrary caller-named byte-array attributes. Unlike the fixed
/// views, its attribute names aren't known in advance; [`super::service::AttributeService`]
/// handles listing and deletion directly against the file's attribute map.
pub struct UserProvider;

impl Provider for UserProvider {
    fn view_name(&self) -> &'static str {
        "user"
    }

    fn attribute_names(&self) -> &'static [&'static str] {
        &[]
    }

    fn default_values(&self, _user_defaults: &HashMap<String, AttributeValue>) -> HashMap<String, AttributeValue> {
        HashMap::new()
    }

    fn get(&self, file: &File, name: &str) -> Option<AttributeValue> {
        file.get_attribute(&format!("user:{name}"))
    }

    fn set(&self, file: &File, name: &str, value: AttributeValue, _on_create: bool) -> FsResult<()> {
        if !matches!(value, AttributeValue::Bytes(_)) {
            return Err(type_mismatch("user", name));
        }
        file.set_attribute(format!("user:{name}"), value);
        Ok(())
    }
}

pub fn make_provider(view: &str) -> FsResult<Box<dyn Provider>> {
    match view {
        "basic" => Ok(Box::new(BasicProvider)),
        "owner" => Ok(Box::new(OwnerProvider)),
        "posix" => Ok(Box::new(PosixProvider)),
        "unix" => Ok(Box::new(UnixProvider)),
        "dos" => Ok(Box::new(DosProvider)),
        "acl" => Ok(Box::new(AclProvider)),
        "user" => Ok(Box::new(UserProvider)),
        other => Err(FsError::with_message(ErrorKind::Unsupported, format!("unknown attribute view '{other}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_reflects_directory_bit_and_permissions() {
        let provider = UnixProvider;
        let file = File::new_directory(std::sync::Weak::new());
        file.set_attribute("posix:permissions", AttributeValue::Text("rwxr-xr-x".into()));
        let AttributeValue::U32(mode) = provider.get(&file, "mode").unwrap() else { panic!("expected u32") };
        assert_eq!(mode & 0o170000, 0o040000);
        assert_eq!(mode & 0o777, 0o755);
    }

    #[test]
    fn dos_attributes_default_to_false() {
        let provider = DosProvider;
        let file = File::new_directory(std::sync::Weak::new());
        assert_eq!(provider.get(&file, "hidden"), Some(AttributeValue::Bool(false)));
    }
}
