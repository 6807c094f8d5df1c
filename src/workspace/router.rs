use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::debug;

use super::write_json;
use crate::domain::model::{AppDescriptor, RouteEntry};
use crate::error::{Result, RocketError};

pub type RouteTable = BTreeMap<String, RouteEntry>;

/// Route file consumed by the reverse proxy.
pub struct RouterConfig {
    path: PathBuf,
}

/// One entry per sub domain. When two applications share a sub domain the
/// one iterated last wins.
pub fn route_table<'a>(apps: impl IntoIterator<Item = &'a AppDescriptor>) -> RouteTable {
    apps.into_iter()
        .map(|app| {
            (
                app.sub_domain.clone(),
                RouteEntry {
                    container_url: format!(
                        "http://{}:{}",
                        app.container_name, app.expose_http_port
                    ),
                    app_name: app.application_name.clone(),
                    description: String::new(),
                },
            )
        })
        .collect()
}

impl RouterConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces the route file with the table derived from `apps`.
    pub fn write<'a>(&self, apps: impl IntoIterator<Item = &'a AppDescriptor>) -> Result<RouteTable> {
        let routes = route_table(apps);
        write_json(&self.path, &routes)?;
        debug!("Wrote {} routes to {}", routes.len(), self.path.display());
        Ok(routes)
    }

    pub fn read(&self) -> Result<RouteTable> {
        match std::fs::read(&self.path) {
            Ok(data) => serde_json::from_slice(&data)
                .map_err(|e| RocketError::io(&self.path, e.into())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(RouteTable::new()),
            Err(e) => Err(RocketError::io(&self.path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(name: &str, container: &str, sub_domain: &str, port: u16) -> AppDescriptor {
        AppDescriptor {
            application_name: name.into(),
            container_name: container.into(),
            sub_domain: sub_domain.into(),
            expose_http_port: port,
            ..Default::default()
        }
    }

    #[test]
    fn backend_url_points_at_container_port() {
        let apps = [app("blog", "rocket-ghost-5", "blog.localhost", 2368)];
        let routes = route_table(&apps);
        assert_eq!(
            routes["blog.localhost"],
            RouteEntry {
                container_url: "http://rocket-ghost-5:2368".into(),
                app_name: "blog".into(),
                description: String::new(),
            }
        );
    }

    #[test]
    fn shared_sub_domain_keeps_last() {
        let apps = [
            app("one", "rocket-one-1", "same.localhost", 1),
            app("two", "rocket-two-1", "same.localhost", 2),
        ];
        let routes = route_table(&apps);
        assert_eq!(routes.len(), 1);
        assert_eq!(routes["same.localhost"].app_name, "two");
    }

    #[test]
    fn route_file_uses_proxy_field_names() {
        let dir = tempfile::tempdir().unwrap();
        let router = RouterConfig::new(dir.path().join("static").join("application.json"));
        router
            .write(&[app("blog", "rocket-ghost-5", "blog.localhost", 2368)])
            .unwrap();

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(router.path()).unwrap()).unwrap();
        assert_eq!(
            raw,
            serde_json::json!({
                "blog.localhost": {
                    "ContainerURL": "http://rocket-ghost-5:2368",
                    "AppName": "blog",
                    "Description": ""
                }
            })
        );
        assert_eq!(router.read().unwrap().len(), 1);
    }

    #[test]
    fn missing_route_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(RouterConfig::new(dir.path().join("none.json"))
            .read()
            .unwrap()
            .is_empty());
    }
}
