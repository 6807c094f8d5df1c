use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::domain::model::AppDescriptor;
use crate::error::{Result, RocketError};

pub mod router;

use router::{RouteTable, RouterConfig};

#[derive(Debug, Default, Serialize, Deserialize)]
struct WorkspaceDocument {
    #[serde(default)]
    applications: BTreeMap<String, AppDescriptor>,
}

/// Applications registered on this host, keyed by container name.
///
/// Every mutation rewrites the whole document and then regenerates the
/// route file, so both stay in step across restarts.
pub struct Workspace {
    path: PathBuf,
    router: RouterConfig,
}

impl Workspace {
    pub fn new(path: impl Into<PathBuf>, router: RouterConfig) -> Self {
        Self {
            path: path.into(),
            router,
        }
    }

    pub fn router(&self) -> &RouterConfig {
        &self.router
    }

    pub fn get_apps(&self) -> Result<BTreeMap<String, AppDescriptor>> {
        Ok(self.read()?.applications)
    }

    pub fn get_app_cfg(&self, container_name: &str) -> Result<AppDescriptor> {
        self.read()?
            .applications
            .remove(container_name)
            .ok_or_else(|| RocketError::AppNotRegistered(container_name.to_string()))
    }

    pub fn register(&self, descriptor: AppDescriptor) -> Result<()> {
        let mut document = self.read()?;
        if document.applications.contains_key(&descriptor.container_name) {
            return Err(RocketError::AppAlreadyRegistered(descriptor.container_name));
        }
        let previous = document.applications.clone();
        let container_name = descriptor.container_name.clone();
        document
            .applications
            .insert(container_name.clone(), descriptor);
        self.commit(previous, &document)?;
        info!("Registered {container_name}");
        Ok(())
    }

    pub fn unregister(&self, container_name: &str) -> Result<AppDescriptor> {
        let mut document = self.read()?;
        let previous = document.applications.clone();
        let removed = document
            .applications
            .remove(container_name)
            .ok_or_else(|| RocketError::AppNotRegistered(container_name.to_string()))?;
        self.commit(previous, &document)?;
        info!("Unregistered {container_name}");
        Ok(removed)
    }

    /// Regenerates the route file from the registered applications.
    pub fn sync_router(&self) -> Result<RouteTable> {
        let document = self.read()?;
        self.router.write(document.applications.values())
    }

    fn read(&self) -> Result<WorkspaceDocument> {
        let data = match std::fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No workspace at {}, starting empty", self.path.display());
                return Ok(WorkspaceDocument::default());
            }
            Err(e) => return Err(RocketError::io(&self.path, e)),
        };
        serde_json::from_slice(&data).map_err(|e| RocketError::WorkspaceCorrupt {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    /// Persists `document` and its route table. If the route file can't be
    /// written the previous applications are put back before failing.
    fn commit(
        &self,
        previous: BTreeMap<String, AppDescriptor>,
        document: &WorkspaceDocument,
    ) -> Result<()> {
        write_json(&self.path, document)?;
        if let Err(e) = self.router.write(document.applications.values()) {
            warn!("Route file update failed, restoring workspace: {e}");
            write_json(
                &self.path,
                &WorkspaceDocument {
                    applications: previous,
                },
            )?;
            return Err(e);
        }
        Ok(())
    }
}

/// Pretty-prints `value` to a temp file next to `path`, then renames it over
/// `path`. Readers see either the old or the new document.
pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let data = serde_json::to_vec_pretty(value).map_err(|e| RocketError::io(path, e.into()))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|e| RocketError::io(dir, e))?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| RocketError::io(dir, e))?;
    tmp.write_all(&data).map_err(|e| RocketError::io(path, e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| RocketError::io(path, e))?;
    tmp.persist(path).map_err(|e| RocketError::io(path, e.error))?;
    Ok(())
}
