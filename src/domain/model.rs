use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const APPLICATION_NAME: &str = "rocket";
pub const LOCAL_DOMAIN_SUFFIX: &str = ".localhost";
pub const DEFAULT_IMAGE_VERSION: &str = "latest";

/// Canonical, schema-independent description of a launchable application.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppDescriptor {
    pub application_name: String,
    pub container_name: String,
    pub image_url: String,
    pub image_version: String,
    pub sub_domain: String,
    pub expose_http_port: u16,
    pub network_name: String,
    /// host dir -> container dir
    pub mount_dirs: BTreeMap<String, String>,
    /// host port -> container port
    pub bind_ports: BTreeMap<u16, u16>,
    pub env_vars: BTreeMap<String, String>,
}

impl AppDescriptor {
    /// Image identity used to merge descriptors coming from several registries.
    pub fn image_identity(&self) -> String {
        image_with_version(&self.image_url, &self.image_version)
    }
}

/// A registry location with its priority; lower rank wins.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegistrySource {
    pub uri: String,
    pub rank: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RankedAppDescriptor {
    pub rank: usize,
    pub descriptor: AppDescriptor,
}

/// One entry of the route file read by the reverse proxy.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteEntry {
    #[serde(rename = "ContainerURL")]
    pub container_url: String,
    #[serde(rename = "AppName")]
    pub app_name: String,
    #[serde(rename = "Description")]
    pub description: String,
}

fn sanitize(part: &str) -> String {
    part.trim().replace(['/', '\\', ':', '.'], "-")
}

/// Derives the container name of an application from its image.
///
/// Registry path segments are dropped so `docker.io/library/ghost` and
/// `ghost` map to the same container, then separators are replaced so the
/// result is a valid container and DNS name.
pub fn container_name(image_url: &str, image_version: &str) -> String {
    let image = image_url
        .trim()
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();
    let version = match image_version.trim() {
        "" => DEFAULT_IMAGE_VERSION,
        version => version,
    };
    format!("{}-{}-{}", APPLICATION_NAME, sanitize(image), sanitize(version))
}

/// Appends `.localhost` unless already present.
pub fn local_sub_domain(hostname: &str) -> String {
    let hostname = hostname.trim();
    if hostname.ends_with(LOCAL_DOMAIN_SUFFIX) {
        hostname.to_string()
    } else {
        format!("{hostname}{LOCAL_DOMAIN_SUFFIX}")
    }
}

pub fn image_with_version(image_url: &str, image_version: &str) -> String {
    match image_version.trim() {
        "" => format!("{}:{}", image_url.trim(), DEFAULT_IMAGE_VERSION),
        version => format!("{}:{}", image_url.trim(), version),
    }
}

/// Splits `repo/image:tag` into image and tag, defaulting the tag to `latest`.
/// A colon belonging to a registry port (`host:5000/image`) is not a tag.
pub fn split_image_reference(reference: &str) -> (String, String) {
    let last_segment_start = reference.rfind('/').map(|i| i + 1).unwrap_or(0);
    match reference[last_segment_start..].find(':') {
        Some(i) => {
            let split = last_segment_start + i;
            (
                reference[..split].to_string(),
                reference[split + 1..].to_string(),
            )
        }
        None => (reference.to_string(), DEFAULT_IMAGE_VERSION.to_string()),
    }
}
