use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::domain::model::RegistrySource;
use crate::error::{Result, RocketError};

pub const DEFAULT_REGISTRIES: &str = r#"
# These are the Rocket registries
#
# Lines starting with '#' are comments
#
# You can use
# - Remote HTTP registries
# - Local path registries
#
# Registries are prioritised in the order they appear in this file.
# If the same container image and version is offered by several registries,
# only the one listed first shows up in the selection.

# ayayushsharma github gist
https://gist.githubusercontent.com/ayayushsharma/da7d4e4bac0746879cca013f9225d391/raw/rocket.registry.json

# local registry
# /local/file/rocket/rocket.registry.json
"#;

/// Reads the registries descriptor file.
pub struct Locator {
    path: PathBuf,
}

impl Locator {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every source in file order; the line position is the source rank.
    pub fn get_all(&self) -> Result<Vec<RegistrySource>> {
        let data = std::fs::read_to_string(&self.path)
            .map_err(|e| RocketError::io(&self.path, e))?;
        let sources = parse_sources(&data);
        debug!(
            "Read {} registry sources from {}",
            sources.len(),
            self.path.display()
        );
        Ok(sources)
    }

    /// Writes the bundled registries file unless one already exists.
    pub fn ensure_default(&self) -> Result<bool> {
        if self.path.exists() {
            return Ok(false);
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| RocketError::io(parent, e))?;
        }
        std::fs::write(&self.path, DEFAULT_REGISTRIES.trim_start())
            .map_err(|e| RocketError::io(&self.path, e))?;
        info!("Wrote default registries to {}", self.path.display());
        Ok(true)
    }
}

pub fn parse_sources(data: &str) -> Vec<RegistrySource> {
    data.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .enumerate()
        .map(|(rank, uri)| RegistrySource {
            uri: uri.to_string(),
            rank,
        })
        .collect()
}
