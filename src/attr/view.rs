//! [`AttributeView`]: a late-bound handle onto one file's view of one
//! attribute view. Holding the file by `Arc` rather than by path means it
//! keeps working across a rename — this tree's `File` identity is never
//! tied to a path in the first place.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::FsResult;
use crate::tree::File;

use super::{AttributeService, AttributeValue};

pub struct AttributeView {
    service: Arc<AttributeService>,
    file: Arc<File>,
    view_name: &'static str,
}

impl AttributeView {
    pub fn new(service: Arc<AttributeService>, file: Arc<File>, view_name: &'static str) -> Option<AttributeView> {
        service.supports_view(view_name).then_some(AttributeView { service, file, view_name })
    }

    pub fn name(&self) -> &'static str {
        self.view_name
    }

    pub fn read_attributes(&self) -> FsResult<HashMap<String, AttributeValue>> {
        self.service.read_attributes(&self.file, &format!("{}:*", self.view_name))
    }

    pub fn get_attribute(&self, name: &str) -> FsResult<AttributeValue> {
        self.service.get_attribute(&self.file, &format!("{}:{}", self.view_name, name))
    }

    pub fn set_attribute(&self, name: &str, value: AttributeValue) -> FsResult<()> {
        self.service.set_attribute(&self.file, &format!("{}:{}", self.view_name, name), value, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Weak;

    #[test]
    fn view_survives_being_detached_from_any_path() {
        let service = Arc::new(AttributeService::new(&["basic"], HashMap::new()).unwrap());
        let file = File::new_directory(Weak::new());
        service.set_initial_attributes(&file, &HashMap::new()).unwrap();
        let view = AttributeView::new(service, file, "basic").unwrap();
        assert_eq!(view.get_attribute("isDirectory").unwrap(), AttributeValue::Bool(true));
    }

    #[test]
    fn view_for_unsupported_name_is_none() {
        let service = Arc::new(AttributeService::new(&["basic"], HashMap::new()).unwrap());
        let file = File::new_directory(Weak::new());
        assert!(AttributeView::new(service, file, "acl").is_none());
    }
}
