use std::collections::HashMap;

use anyhow::{Context, Error};
use async_trait::async_trait;
use bollard::{
    container::{
        Config, CreateContainerOptions, NetworkingConfig, RemoveContainerOptions,
        StartContainerOptions, StopContainerOptions,
    },
    errors::Error as DockerError,
    image::CreateImageOptions,
    network::{CreateNetworkOptions, InspectNetworkOptions},
    secret::{
        CreateImageInfo, EndpointSettings, HostConfig, PortBinding, RestartPolicy,
        RestartPolicyNameEnum,
    },
    Docker,
};
use futures::TryStreamExt;
use log::{debug, info};
use map_macro::hash_map;

use crate::domain::{
    model::{image_with_version, AppDescriptor},
    port::ContainerRuntime,
};

pub struct DockerRuntime {
    pub docker: Docker,
}

fn is_not_found(error: &DockerError) -> bool {
    matches!(
        error,
        DockerError::DockerResponseServerError {
            status_code: 404,
            ..
        }
    )
}

/// Container configuration for a registered application.
pub fn container_config(application: &AppDescriptor) -> Config<String> {
    let exposed_port = format!("{}/tcp", application.expose_http_port);
    let port_bindings: HashMap<String, Option<Vec<PortBinding>>> = application
        .bind_ports
        .iter()
        .map(|(host, container)| {
            (
                format!("{}/tcp", container),
                Some(vec![PortBinding {
                    host_ip: None,
                    host_port: Some(host.to_string()),
                }]),
            )
        })
        .collect();
    let binds: Vec<String> = application
        .mount_dirs
        .iter()
        .map(|(host, container)| format!("{}:{}", host, container))
        .collect();
    let env: Vec<String> = application
        .env_vars
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect();

    Config {
        image: Some(image_with_version(
            &application.image_url,
            &application.image_version,
        )),
        env: Some(env),
        exposed_ports: Some(hash_map! {
            exposed_port => HashMap::new()
        }),
        host_config: Some(HostConfig {
            binds: Some(binds),
            port_bindings: Some(port_bindings),
            restart_policy: Some(RestartPolicy {
                name: Some(RestartPolicyNameEnum::UNLESS_STOPPED),
                maximum_retry_count: None,
            }),
            ..Default::default()
        }),
        labels: Some(hash_map! {
            String::from("rocket.application.name") => application.application_name.clone(),
            String::from("rocket.sub_domain") => application.sub_domain.clone(),
        }),
        networking_config: Some(NetworkingConfig {
            endpoints_config: hash_map! {
                application.network_name.clone() => EndpointSettings {
                    aliases: Some(vec![application.container_name.clone()]),
                    ..Default::default()
                }
            },
        }),
        ..Default::default()
    }
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    async fn image_exists(&self, image: &str) -> Result<bool, Error> {
        match self.docker.inspect_image(image).await {
            Ok(_) => Ok(true),
            Err(e) if is_not_found(&e) => Ok(false),
            Err(e) => Err(Error::from(e).context(format!("Can't inspect image {}", image))),
        }
    }

    async fn pull_image(&self, image: &str) -> Result<(), Error> {
        self.docker
            .create_image(
                Some(CreateImageOptions {
                    from_image: image,
                    ..Default::default()
                }),
                None,
                None,
            )
            .try_collect::<Vec<CreateImageInfo>>()
            .await
            .context(format!("Error while pulling image {}", image))?;
        info!("Pulled image {}", image);
        Ok(())
    }

    async fn container_exists(&self, container_name: &str) -> Result<bool, Error> {
        match self.docker.inspect_container(container_name, None).await {
            Ok(_) => Ok(true),
            Err(e) if is_not_found(&e) => Ok(false),
            Err(e) => Err(Error::from(e).context(format!(
                "Can't inspect container {}",
                container_name
            ))),
        }
    }

    async fn create_container(&self, application: &AppDescriptor) -> Result<(), Error> {
        let container = self
            .docker
            .create_container(
                Some(CreateContainerOptions {
                    name: application.container_name.as_str(),
                    platform: None,
                }),
                container_config(application),
            )
            .await?;
        debug!(
            "Created container {} ({})",
            application.container_name, container.id
        );
        Ok(())
    }

    async fn start_service(&self, container_name: &str) -> Result<(), Error> {
        self.docker
            .start_container(container_name, None::<StartContainerOptions<String>>)
            .await
            .context(format!("Error starting container {}", container_name))
    }

    async fn stop_service(&self, container_name: &str) -> Result<(), Error> {
        self.docker
            .stop_container(container_name, None::<StopContainerOptions>)
            .await
            .context(format!("Error stopping container {}", container_name))
    }

    async fn remove_container(&self, container_name: &str) -> Result<(), Error> {
        self.docker
            .remove_container(
                container_name,
                Some(RemoveContainerOptions {
                    force: true,
                    v: true,
                    ..Default::default()
                }),
            )
            .await
            .context(format!("Error while removing container {}", container_name))
    }

    async fn network_exists(&self, network: &str) -> Result<bool, Error> {
        match self
            .docker
            .inspect_network(network, None::<InspectNetworkOptions<String>>)
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if is_not_found(&e) => Ok(false),
            Err(e) => Err(Error::from(e).context(format!("Can't inspect network {}", network))),
        }
    }

    async fn create_network(&self, network: &str) -> Result<(), Error> {
        self.docker
            .create_network(CreateNetworkOptions {
                name: network,
                driver: "bridge",
                ..Default::default()
            })
            .await
            .context(format!("Error creating network {}", network))?;
        Ok(())
    }
}
