use std::error::Error;

use anyhow::Context;
use bollard::{Docker, API_DEFAULT_VERSION};
use log::info;
use rocket::{
    config::load_config,
    domain::RocketService,
    infra::{docker::DockerRuntime, web::router},
    registry::{locator::Locator, Registry},
    workspace::{router::RouterConfig, Workspace},
};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    info!("Start Rocket - self hosted applications on your own machine");

    let config = load_config()?;
    info!("Loaded config {:?}", config);

    let locator = Locator::new(config.registries_path());
    locator.ensure_default()?;
    let workspace = Workspace::new(config.workspace_path(), RouterConfig::new(config.routes_path()));
    // the proxy may have been started against a stale or missing table
    workspace.sync_router()?;

    let docker = Docker::connect_with_socket(&config.docker_socket, 120, API_DEFAULT_VERSION)
        .context("Can't connect to docker socket")?;

    let service = RocketService {
        registry: Registry::new(locator, config.fetch_timeout()),
        workspace,
        container_runtime: Box::new(DockerRuntime { docker }),
        network: config.network.clone(),
    };

    let listener = TcpListener::bind(&config.listen)
        .await
        .context(format!("Can't listen on {}", config.listen))?;
    info!("Listening on {}", config.listen);
    axum::serve(listener, router(service)).await?;
    Ok(())
}
