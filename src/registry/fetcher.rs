use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use log::{debug, error};
use tokio::task::JoinSet;
use url::Url;

use crate::domain::model::RegistrySource;
use crate::error::{Result, RocketError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    Remote(Url),
    Local(PathBuf),
}

/// Outcome of fetching one registry source.
#[derive(Debug)]
pub struct RawFetchResult {
    pub source: RegistrySource,
    pub payload: Result<Vec<u8>>,
}

pub fn classify(uri: &str) -> Result<SourceKind> {
    if let Ok(url) = Url::parse(uri) {
        let has_host = url.host_str().is_some_and(|host| !host.is_empty());
        if matches!(url.scheme(), "http" | "https") && has_host {
            return Ok(SourceKind::Remote(url));
        }
    }
    let path = PathBuf::from(uri);
    if path.exists() {
        Ok(SourceKind::Local(path))
    } else {
        Err(RocketError::InvalidSource(uri.to_string()))
    }
}

#[derive(Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl Fetcher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
        }
    }

    /// Fetches every source concurrently, one task per source.
    ///
    /// Returns once all tasks have finished, with one result per source
    /// ordered by rank. A failing source never aborts the others.
    pub async fn fetch(&self, sources: &[RegistrySource]) -> Vec<RawFetchResult> {
        let mut tasks = JoinSet::new();
        let mut pending = HashMap::new();
        for source in sources {
            let fetcher = self.clone();
            let task_source = source.clone();
            let handle = tasks.spawn(async move {
                let payload = fetcher.fetch_one(&task_source.uri).await;
                RawFetchResult {
                    source: task_source,
                    payload,
                }
            });
            pending.insert(handle.id(), source.clone());
        }

        let mut results = Vec::with_capacity(sources.len());
        while let Some(joined) = tasks.join_next_with_id().await {
            match joined {
                Ok((id, result)) => {
                    pending.remove(&id);
                    results.push(result);
                }
                Err(join_error) => {
                    error!("Registry fetch task failed: {join_error}");
                    if let Some(source) = pending.remove(&join_error.id()) {
                        let message = join_error.to_string();
                        results.push(RawFetchResult {
                            payload: Err(RocketError::Fetch {
                                uri: source.uri.clone(),
                                message,
                            }),
                            source,
                        });
                    }
                }
            }
        }
        results.sort_by_key(|result| result.source.rank);
        results
    }

    async fn fetch_one(&self, uri: &str) -> Result<Vec<u8>> {
        let kind = classify(uri)?;
        let fetch = async {
            match &kind {
                SourceKind::Remote(url) => self.fetch_remote(url).await,
                SourceKind::Local(path) => tokio::fs::read(path)
                    .await
                    .map_err(|e| RocketError::io(path, e)),
            }
        };
        let bytes = tokio::time::timeout(self.timeout, fetch)
            .await
            .map_err(|_| RocketError::Timeout {
                uri: uri.to_string(),
                after: self.timeout,
            })??;
        debug!("Fetched {} bytes from {}", bytes.len(), uri);
        Ok(bytes)
    }

    async fn fetch_remote(&self, url: &Url) -> Result<Vec<u8>> {
        let fetch_error = |message: String| RocketError::Fetch {
            uri: url.to_string(),
            message,
        };
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;
        if !response.status().is_success() {
            return Err(fetch_error(format!("server answered {}", response.status())));
        }
        let body = response
            .bytes()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;
        Ok(body.to_vec())
    }
}
