use serde::Deserialize;

use super::SchemaParser;
use crate::domain::model::{container_name, local_sub_domain, split_image_reference, AppDescriptor};
use crate::error::{Result, RocketError};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegistryAppV1 {
    name: String,
    artifactory_url: String,
    #[serde(default)]
    version: String,
    http_port: u16,
    #[serde(default)]
    hostname: String,
}

#[derive(Deserialize)]
struct RegistryV1 {
    #[serde(default)]
    applications: Vec<RegistryAppV1>,
}

pub struct V1Parser;

impl SchemaParser for V1Parser {
    fn parse(&self, payload: &[u8]) -> Result<Vec<AppDescriptor>> {
        let registry: RegistryV1 = serde_json::from_slice(payload)
            .map_err(|e| RocketError::UnsupportedFormat(e.to_string()))?;
        Ok(registry.applications.into_iter().map(to_descriptor).collect())
    }
}

fn to_descriptor(app: RegistryAppV1) -> AppDescriptor {
    let hostname = if app.hostname.trim().is_empty() {
        app.name.to_lowercase()
    } else {
        app.hostname
    };
    // a blank version may still be carried by the image reference itself
    let (image_url, image_version) = if app.version.trim().is_empty() {
        split_image_reference(app.artifactory_url.trim())
    } else {
        (app.artifactory_url, app.version)
    };
    AppDescriptor {
        container_name: container_name(&image_url, &image_version),
        sub_domain: local_sub_domain(&hostname),
        application_name: app.name,
        image_url,
        image_version,
        expose_http_port: app.http_port,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::image_with_version;

    #[test]
    fn maps_applications_to_descriptors() {
        let payload = br#"{
            "version": 1,
            "applications": [
                {"name": "blog", "artifactoryUrl": "ghost", "version": "5", "httpPort": 2368, "hostname": "blog"},
                {"name": "Wiki", "artifactoryUrl": "docker.io/requarks/wiki", "version": "2.5", "httpPort": 3000, "hostname": "wiki.localhost"}
            ]
        }"#;
        let apps = V1Parser.parse(payload).unwrap();

        assert_eq!(
            apps[0],
            AppDescriptor {
                application_name: "blog".into(),
                container_name: "rocket-ghost-5".into(),
                image_url: "ghost".into(),
                image_version: "5".into(),
                sub_domain: "blog.localhost".into(),
                expose_http_port: 2368,
                ..Default::default()
            }
        );
        assert_eq!(apps[1].sub_domain, "wiki.localhost");
        assert_eq!(apps[1].container_name, "rocket-wiki-2-5");
    }

    #[test]
    fn missing_hostname_falls_back_to_name() {
        let payload = br#"{"version": 1, "applications": [
            {"name": "Notes", "artifactoryUrl": "notes", "httpPort": 80}
        ]}"#;
        let apps = V1Parser.parse(payload).unwrap();
        assert_eq!(apps[0].sub_domain, "notes.localhost");
        assert_eq!(apps[0].container_name, "rocket-notes-latest");
    }

    #[test]
    fn tag_in_image_reference_becomes_the_version() {
        let payload = br#"{"version": 1, "applications": [
            {"name": "blog", "artifactoryUrl": "ghost:5", "httpPort": 2368, "hostname": "blog"},
            {"name": "registry", "artifactoryUrl": "localhost:5000/team/app", "httpPort": 80}
        ]}"#;
        let apps = V1Parser.parse(payload).unwrap();

        assert_eq!(apps[0].image_url, "ghost");
        assert_eq!(apps[0].image_version, "5");
        assert_eq!(apps[0].container_name, "rocket-ghost-5");
        assert_eq!(
            image_with_version(&apps[0].image_url, &apps[0].image_version),
            "ghost:5"
        );

        assert_eq!(apps[1].image_url, "localhost:5000/team/app");
        assert_eq!(apps[1].image_version, "latest");
        assert_eq!(
            image_with_version(&apps[1].image_url, &apps[1].image_version),
            "localhost:5000/team/app:latest"
        );
    }

    #[test]
    fn wrong_field_types_are_unsupported_format() {
        let payload = br#"{"version": 1, "applications": [
            {"name": "blog", "artifactoryUrl": "ghost", "httpPort": "not a port"}
        ]}"#;
        assert!(matches!(
            V1Parser.parse(payload),
            Err(RocketError::UnsupportedFormat(_))
        ));
    }
}
