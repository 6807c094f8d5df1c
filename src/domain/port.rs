use anyhow::Error;
use async_trait::async_trait;

use super::model::AppDescriptor;

#[async_trait]
pub trait ContainerRuntime {
    async fn image_exists(&self, image: &str) -> Result<bool, Error>;

    async fn pull_image(&self, image: &str) -> Result<(), Error>;

    async fn container_exists(&self, container_name: &str) -> Result<bool, Error>;

    async fn create_container(&self, application: &AppDescriptor) -> Result<(), Error>;

    async fn start_service(&self, container_name: &str) -> Result<(), Error>;

    async fn stop_service(&self, container_name: &str) -> Result<(), Error>;

    async fn remove_container(&self, container_name: &str) -> Result<(), Error>;

    async fn network_exists(&self, network: &str) -> Result<bool, Error>;

    async fn create_network(&self, network: &str) -> Result<(), Error>;
}

/// Picks one application out of the merged registry listing.
/// `None` means nothing was selected and registration is cancelled.
pub trait Selector {
    fn select(&self, applications: &[AppDescriptor]) -> Option<AppDescriptor>;
}
