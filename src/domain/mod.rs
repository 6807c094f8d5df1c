use anyhow::{Context, Error};
use log::info;
use model::{image_with_version, AppDescriptor};
use port::{ContainerRuntime, Selector};

use crate::error::RocketError;
use crate::registry::Registry;
use crate::workspace::Workspace;

pub mod model;
pub mod port;

pub struct RocketService {
    pub registry: Registry,
    pub workspace: Workspace,
    pub container_runtime: Box<dyn ContainerRuntime + 'static + Sync + Send>,
    pub network: String,
}

pub enum Event {
    Register(AppDescriptor),
    Unregister(String),
    Start(String),
    Stop(String),
    Sync,
}

pub async fn reconcile(event: Event, service: &RocketService) -> Result<(), Error> {
    let runtime = &service.container_runtime;
    match event {
        Event::Register(mut application) => {
            if service
                .workspace
                .get_apps()?
                .contains_key(&application.container_name)
            {
                return Err(RocketError::AppAlreadyRegistered(application.container_name).into());
            }
            if application.network_name.is_empty() {
                application.network_name = service.network.clone();
            }
            if !runtime.network_exists(&application.network_name).await? {
                runtime
                    .create_network(&application.network_name)
                    .await
                    .context("Can't create application network")?;
                info!("Created network {}", application.network_name);
            }
            let image = image_with_version(&application.image_url, &application.image_version);
            if !runtime.image_exists(&image).await? {
                info!("Pull image {}", image);
                runtime.pull_image(&image).await?;
            }
            service.workspace.register(application.clone())?;
            if !runtime.container_exists(&application.container_name).await? {
                runtime
                    .create_container(&application)
                    .await
                    .context(format!("Can't create container {}", application.container_name))?;
            }
            runtime.start_service(&application.container_name).await?;
            info!(
                "Application {} available at http://{}",
                application.application_name, application.sub_domain
            );
            Ok(())
        }
        Event::Unregister(container_name) => {
            service.workspace.get_app_cfg(&container_name)?;
            if runtime.container_exists(&container_name).await? {
                runtime.stop_service(&container_name).await?;
                runtime.remove_container(&container_name).await?;
                info!("Container {} removed", container_name);
            }
            service.workspace.unregister(&container_name)?;
            Ok(())
        }
        Event::Start(container_name) => {
            let application = service.workspace.get_app_cfg(&container_name)?;
            runtime.start_service(&application.container_name).await?;
            info!("Application {} started", application.application_name);
            Ok(())
        }
        Event::Stop(container_name) => {
            let application = service.workspace.get_app_cfg(&container_name)?;
            runtime.stop_service(&application.container_name).await?;
            info!("Application {} stopped", application.application_name);
            Ok(())
        }
        Event::Sync => {
            let routes = service.workspace.sync_router()?;
            info!("Router synced with {} routes", routes.len());
            Ok(())
        }
    }
}

pub async fn list_available(service: &RocketService) -> Result<Vec<AppDescriptor>, Error> {
    Ok(service.registry.available_apps().await?)
}

/// Lets `selector` pick from the merged registries, then registers the pick.
pub async fn register_selected(
    service: &RocketService,
    selector: &(dyn Selector + Sync),
) -> Result<AppDescriptor, Error> {
    let available = list_available(service).await?;
    let selected = selector
        .select(&available)
        .ok_or(RocketError::NoAppSelected)?;
    reconcile(Event::Register(selected.clone()), service).await?;
    service
        .workspace
        .get_app_cfg(&selected.container_name)
        .map_err(Error::from)
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashSet;
    use std::path::Path;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::registry::locator::Locator;
    use crate::workspace::router::RouterConfig;

    /// Records every runtime call; images, containers and networks listed
    /// in `existing` are reported as already present.
    #[derive(Default)]
    pub struct RecordingRuntime {
        pub calls: Mutex<Vec<String>>,
        pub existing: Mutex<HashSet<String>>,
    }

    impl RecordingRuntime {
        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn has(&self, name: &str) -> bool {
            self.existing.lock().unwrap().contains(name)
        }
    }

    #[async_trait]
    impl ContainerRuntime for std::sync::Arc<RecordingRuntime> {
        async fn image_exists(&self, image: &str) -> Result<bool, Error> {
            Ok(self.has(image))
        }

        async fn pull_image(&self, image: &str) -> Result<(), Error> {
            self.record(format!("pull {image}"));
            Ok(())
        }

        async fn container_exists(&self, container_name: &str) -> Result<bool, Error> {
            Ok(self.has(container_name))
        }

        async fn create_container(&self, application: &AppDescriptor) -> Result<(), Error> {
            self.record(format!(
                "create {} on {}",
                application.container_name, application.network_name
            ));
            self.existing
                .lock()
                .unwrap()
                .insert(application.container_name.clone());
            Ok(())
        }

        async fn start_service(&self, container_name: &str) -> Result<(), Error> {
            self.record(format!("start {container_name}"));
            Ok(())
        }

        async fn stop_service(&self, container_name: &str) -> Result<(), Error> {
            self.record(format!("stop {container_name}"));
            Ok(())
        }

        async fn remove_container(&self, container_name: &str) -> Result<(), Error> {
            self.record(format!("remove {container_name}"));
            self.existing.lock().unwrap().remove(container_name);
            Ok(())
        }

        async fn network_exists(&self, network: &str) -> Result<bool, Error> {
            Ok(self.has(network))
        }

        async fn create_network(&self, network: &str) -> Result<(), Error> {
            self.record(format!("network {network}"));
            self.existing.lock().unwrap().insert(network.to_string());
            Ok(())
        }
    }

    pub fn service(dir: &Path, runtime: std::sync::Arc<RecordingRuntime>) -> RocketService {
        RocketService {
            registry: Registry::new(Locator::new(dir.join("registries")), Duration::from_secs(5)),
            workspace: Workspace::new(
                dir.join("registered.rockets.json"),
                RouterConfig::new(dir.join("application.json")),
            ),
            container_runtime: Box::new(runtime),
            network: "rocket".to_string(),
        }
    }

    pub fn blog() -> AppDescriptor {
        AppDescriptor {
            application_name: "blog".into(),
            container_name: "rocket-ghost-5".into(),
            image_url: "ghost".into(),
            image_version: "5".into(),
            sub_domain: "blog.localhost".into(),
            expose_http_port: 2368,
            ..Default::default()
        }
    }
}
