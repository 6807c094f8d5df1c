use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Error};
use config::{Config, Environment};

use crate::domain::model::APPLICATION_NAME;

#[derive(Debug, serde::Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    pub config_dir: PathBuf,
    pub registries_file: Option<PathBuf>,
    pub workspace_file: Option<PathBuf>,
    pub routes_file: Option<PathBuf>,
    pub fetch_timeout_secs: u64,
    pub network: String,
    pub docker_socket: String,
    pub listen: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let home = std::env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            config_dir: home.join(".config").join(APPLICATION_NAME),
            registries_file: None,
            workspace_file: None,
            routes_file: None,
            fetch_timeout_secs: 30,
            network: APPLICATION_NAME.to_string(),
            docker_socket: "/var/run/docker.sock".to_string(),
            listen: "127.0.0.1:32101".to_string(),
        }
    }
}

impl AppConfig {
    pub fn registries_path(&self) -> PathBuf {
        self.registries_file
            .clone()
            .unwrap_or_else(|| self.config_dir.join("registries"))
    }

    pub fn workspace_path(&self) -> PathBuf {
        self.workspace_file
            .clone()
            .unwrap_or_else(|| self.config_dir.join("registered.rockets.json"))
    }

    pub fn routes_path(&self) -> PathBuf {
        self.routes_file.clone().unwrap_or_else(|| {
            self.config_dir
                .join("home-page")
                .join("static")
                .join("application.json")
        })
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

pub fn load_config() -> Result<AppConfig, Error> {
    load_config_from(Environment::with_prefix(APPLICATION_NAME))
}

fn load_config_from(environment: Environment) -> Result<AppConfig, Error> {
    let config = Config::builder()
        .add_source(
            environment
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("Can't load configuration")?;

    config
        .try_deserialize()
        .context("Can't deserialize AppConfig from loaded configuration")
}
