use crate::domain::{model::AppDescriptor, port::Selector};

/// Selects an application by name, case-insensitively, optionally pinned to
/// one image version. Without a version the first match wins.
pub struct NameSelector {
    pub name: String,
    pub version: Option<String>,
}

impl Selector for NameSelector {
    fn select(&self, applications: &[AppDescriptor]) -> Option<AppDescriptor> {
        applications
            .iter()
            .filter(|app| app.application_name.eq_ignore_ascii_case(&self.name))
            .find(|app| {
                self.version
                    .as_deref()
                    .map_or(true, |version| app.image_version == version)
            })
            .cloned()
    }
}
