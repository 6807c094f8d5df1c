use std::time::Duration;

use log::{info, warn};

use crate::domain::model::{AppDescriptor, RankedAppDescriptor};
use crate::error::Result;

pub mod dedup;
pub mod fetcher;
pub mod locator;
pub mod schema;

use fetcher::{Fetcher, RawFetchResult};
use locator::Locator;
use schema::SchemaRegistry;

/// Ingestion pipeline over every registry listed in the descriptor file.
pub struct Registry {
    pub locator: Locator,
    pub fetcher: Fetcher,
    pub schemas: SchemaRegistry,
}

impl Registry {
    pub fn new(locator: Locator, fetch_timeout: Duration) -> Self {
        Self {
            locator,
            fetcher: Fetcher::new(fetch_timeout),
            schemas: SchemaRegistry::default(),
        }
    }

    /// Applications offered by all reachable registries, merged by image.
    ///
    /// Only an unreadable descriptor file fails; sources that cannot be
    /// fetched or parsed are logged and skipped.
    pub async fn available_apps(&self) -> Result<Vec<AppDescriptor>> {
        let sources = self.locator.get_all()?;
        let fetched = self.fetcher.fetch(&sources).await;
        let ranked = parse_all(&self.schemas, fetched);
        let merged = dedup::merge(ranked);
        info!(
            "{} applications available from {} registries listed in {} (schema versions {:?})",
            merged.len(),
            sources.len(),
            self.locator.path().display(),
            self.schemas.versions()
        );
        Ok(merged)
    }
}

fn parse_all(schemas: &SchemaRegistry, fetched: Vec<RawFetchResult>) -> Vec<RankedAppDescriptor> {
    let mut ranked = Vec::new();
    for RawFetchResult { source, payload } in fetched {
        let parsed = payload.and_then(|bytes| schemas.parse(&bytes));
        match parsed {
            Ok(descriptors) => ranked.extend(descriptors.into_iter().map(|descriptor| {
                RankedAppDescriptor {
                    rank: source.rank,
                    descriptor,
                }
            })),
            Err(e) => warn!(
                "Skipping registry {} (rank {}): {}",
                source.uri, source.rank, e
            ),
        }
    }
    ranked
}
