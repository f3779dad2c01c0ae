//! [`AttributeService`]: composes the enabled views (transitive closure
//! over [`Provider::inherits`]) and dispatches `"view:name"` attribute
//! specs to the provider that owns them.

use std::collections::HashMap;

use crate::error::{ErrorKind, FsError, FsResult};
use crate::tree::File;

use super::providers::make_provider;
use super::{AttributeValue, Provider};

pub struct AttributeService {
    providers: HashMap<&'static str, Box<dyn Provider>>,
    default_overrides: HashMap<String, AttributeValue>,
}

fn split_spec(spec: &str) -> (&str, &str) {
    match spec.split_once(':') {
        Some((view, name)) => (view, name),
        None => ("basic", spec),
    }
}

impl AttributeService {
    /// Enables `requested_views` and everything they transitively inherit.
    pub fn new(requested_views: &[&str], default_overrides: HashMap<String, AttributeValue>) -> FsResult<AttributeService> {
        let mut providers: HashMap<&'static str, Box<dyn Provider>> = HashMap::new();
        let mut queue: Vec<String> = requested_views.iter().map(|v| v.to_string()).collect();
        while let Some(view) = queue.pop() {
            if providers.contains_key(view.as_str()) {
                continue;
            }
            let provider = make_provider(&view)?;
            queue.extend(provider.inherits().iter().map(|v| v.to_string()));
            providers.insert(provider.view_name(), provider);
        }
        Ok(AttributeService { providers, default_overrides })
    }

    pub fn supports_view(&self, view: &str) -> bool {
        self.providers.contains_key(view)
    }

    fn provider_for(&self, view: &str) -> FsResult<&dyn Provider> {
        self.providers
            .get(view)
            .map(|p| p.as_ref())
            .ok_or_else(|| FsError::with_message(ErrorKind::Unsupported, format!("attribute view '{view}' is not enabled")))
    }

    /// Seeds every enabled view's defaults on a newly created file, then
    /// applies caller-supplied `"view:name"` overrides on top.
    pub fn set_initial_attributes(&self, file: &File, overrides: &HashMap<String, AttributeValue>) -> FsResult<()> {
        for provider in self.providers.values() {
            for (name, value) in provider.default_values(&self.default_overrides) {
                file.set_attribute(format!("{}:{}", provider.view_name(), name), value);
            }
        }
        for (spec, value) in overrides {
            self.set_attribute(file, spec, value.clone(), true)?;
        }
        Ok(())
    }

    pub fn get_attribute(&self, file: &File, spec: &str) -> FsResult<AttributeValue> {
        let (view, name) = split_spec(spec);
        if view == "user" {
            return self
                .provider_for("user")?
                .get(file, name)
                .ok_or_else(|| FsError::with_message(ErrorKind::InvalidArgument, format!("no such user attribute '{name}'")));
        }
        self.provider_for(view)?
            .get(file, name)
            .ok_or_else(|| FsError::with_message(ErrorKind::InvalidArgument, format!("unrecognized attribute '{spec}'")))
    }

    pub fn set_attribute(&self, file: &File, spec: &str, value: AttributeValue, on_create: bool) -> FsResult<()> {
        let (view, name) = split_spec(spec);
        self.provider_for(view)?.set(file, name, value, on_create)
    }

    /// `"view:*"` returns every attribute the view defines, including
    /// inherited views; `"view:a,b"` returns exactly those names;
    /// `"view:name"` returns a single-entry map.
    pub fn read_attributes(&self, file: &File, spec: &str) -> FsResult<HashMap<String, AttributeValue>> {
        let (view, name) = split_spec(spec);
        let provider = self.provider_for(view)?;
        if name == "*" {
            let mut result = HashMap::new();
            self.collect_view_attributes(file, provider, &mut result);
            for inherited in provider.inherits() {
                let inherited = self.provider_for(inherited)?;
                self.collect_view_attributes(file, inherited, &mut result);
            }
            Ok(result)
        } else if name.contains(',') {
            let mut result = HashMap::new();
            for single in name.split(',') {
                if single == "*" {
                    return Err(FsError::with_message(
                        ErrorKind::InvalidArgument,
                        format!("cannot mix '*' with explicit attribute names in '{spec}'"),
                    ));
                }
                if let Some(value) = provider.get(file, single) {
                    result.insert(single.to_string(), value);
                }
            }
            Ok(result)
        } else {
            Ok(HashMap::from([(name.to_string(), self.get_attribute(file, spec)?)]))
        }
    }

    fn collect_view_attributes(&self, file: &File, provider: &dyn Provider, out: &mut HashMap<String, AttributeValue>) {
        for &name in provider.attribute_names() {
            if let Some(value) = provider.get(file, name) {
                out.insert(name.to_string(), value);
            }
        }
    }

    pub fn list_user_attributes(&self, file: &File) -> Vec<String> {
        file.attribute_keys_for_view("user")
            .into_iter()
            .map(|key| key.trim_start_matches("user:").to_string())
            .collect()
    }

    pub fn delete_user_attribute(&self, file: &File, name: &str) -> FsResult<()> {
        file.remove_attribute(&format!("user:{name}"))
            .map(|_| ())
            .ok_or_else(|| FsError::with_message(ErrorKind::InvalidArgument, format!("no such user attribute '{name}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Weak;

    fn service() -> AttributeService {
        AttributeService::new(&["unix", "dos", "user"], HashMap::new()).unwrap()
    }

    #[test]
    fn enabling_unix_pulls_in_its_dependencies() {
        let service = service();
        assert!(service.supports_view("basic"));
        assert!(service.supports_view("owner"));
        assert!(service.supports_view("posix"));
    }

    #[test]
    fn initial_attributes_are_readable_back() {
        let service = service();
        let file = File::new_directory(Weak::new());
        service.set_initial_attributes(&file, &HashMap::new()).unwrap();
        assert_eq!(service.get_attribute(&file, "basic:isDirectory").unwrap(), AttributeValue::Bool(true));
        assert_eq!(service.get_attribute(&file, "owner:owner").unwrap(), AttributeValue::Text("nobody".into()));
    }

    #[test]
    fn user_attributes_round_trip_and_delete() {
        let service = service();
        let file = File::new_directory(Weak::new());
        service.set_attribute(&file, "user:tag", AttributeValue::Bytes(vec![1, 2, 3]), false).unwrap();
        assert_eq!(service.list_user_attributes(&file), vec!["tag".to_string()]);
        service.delete_user_attribute(&file, "tag").unwrap();
        assert!(service.delete_user_attribute(&file, "tag").is_err());
    }

    #[test]
    fn unknown_view_is_rejected() {
        assert!(AttributeService::new(&["nope"], HashMap::new()).is_err());
    }

    #[test]
    fn mixing_star_with_explicit_names_is_a_format_error() {
        let service = service();
        let file = File::new_directory(Weak::new());
        service.set_initial_attributes(&file, &HashMap::new()).unwrap();
        assert!(service.read_attributes(&file, "basic:*,size").is_err());
    }
}
