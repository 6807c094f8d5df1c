use std::collections::HashMap;

use log::debug;
use serde::Deserialize;

use crate::domain::model::AppDescriptor;
use crate::error::{Result, RocketError};

pub mod v1;

/// Maps one registry schema version to canonical descriptors.
pub trait SchemaParser: Send + Sync {
    fn parse(&self, payload: &[u8]) -> Result<Vec<AppDescriptor>>;
}

#[derive(Deserialize)]
struct Envelope {
    version: i64,
}

/// Version dispatch table for registry payloads.
pub struct SchemaRegistry {
    parsers: HashMap<i64, Box<dyn SchemaParser>>,
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(1, v1::V1Parser);
        registry
    }
}

impl SchemaRegistry {
    pub fn empty() -> Self {
        Self {
            parsers: HashMap::new(),
        }
    }

    /// Registers `parser` for `version`, replacing any previous parser.
    pub fn register(&mut self, version: i64, parser: impl SchemaParser + 'static) {
        self.parsers.insert(version, Box::new(parser));
    }

    pub fn versions(&self) -> Vec<i64> {
        let mut versions: Vec<i64> = self.parsers.keys().copied().collect();
        versions.sort_unstable();
        versions
    }

    pub fn parse(&self, payload: &[u8]) -> Result<Vec<AppDescriptor>> {
        let envelope: Envelope = serde_json::from_slice(payload)
            .map_err(|e| RocketError::UnsupportedFormat(e.to_string()))?;
        let parser = self
            .parsers
            .get(&envelope.version)
            .ok_or(RocketError::UnsupportedSchemaVersion(envelope.version))?;
        debug!("Parsing registry payload with schema v{}", envelope.version);
        parser.parse(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed;

    impl SchemaParser for Fixed {
        fn parse(&self, _payload: &[u8]) -> Result<Vec<AppDescriptor>> {
            Ok(vec![AppDescriptor {
                application_name: "fixed".into(),
                ..Default::default()
            }])
        }
    }

    #[test]
    fn unknown_version_is_rejected() {
        let result = SchemaRegistry::default().parse(br#"{"version": 7, "applications": []}"#);
        assert!(matches!(
            result,
            Err(RocketError::UnsupportedSchemaVersion(7))
        ));
    }

    #[test]
    fn malformed_payload_is_unsupported_format() {
        let registry = SchemaRegistry::default();
        assert!(matches!(
            registry.parse(b"<html>not json</html>"),
            Err(RocketError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            registry.parse(br#"{"applications": []}"#),
            Err(RocketError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn new_versions_register_independently() {
        let mut registry = SchemaRegistry::default();
        registry.register(2, Fixed);
        assert_eq!(registry.versions(), vec![1, 2]);

        let parsed = registry.parse(br#"{"version": 2, "whatever": true}"#).unwrap();
        assert_eq!(parsed[0].application_name, "fixed");
        assert!(registry
            .parse(br#"{"version": 1, "applications": []}"#)
            .unwrap()
            .is_empty());
    }
}
