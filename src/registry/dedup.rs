use std::collections::HashMap;

use itertools::Itertools;

use crate::domain::model::{AppDescriptor, RankedAppDescriptor};

/// Keeps one descriptor per image identity, preferring the lowest rank.
///
/// Between equal ranks the descriptor seen last wins. The returned order is
/// rank then application name, for display only.
pub fn merge(ranked: impl IntoIterator<Item = RankedAppDescriptor>) -> Vec<AppDescriptor> {
    let mut by_identity: HashMap<String, RankedAppDescriptor> = HashMap::new();
    for candidate in ranked {
        let identity = candidate.descriptor.image_identity();
        match by_identity.get(&identity) {
            Some(kept) if kept.rank < candidate.rank => {}
            _ => {
                by_identity.insert(identity, candidate);
            }
        }
    }
    by_identity
        .into_values()
        .sorted_by(|a, b| {
            a.rank
                .cmp(&b.rank)
                .then_with(|| a.descriptor.application_name.cmp(&b.descriptor.application_name))
        })
        .map(|ranked| ranked.descriptor)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranked(rank: usize, image: &str, version: &str, port: u16) -> RankedAppDescriptor {
        RankedAppDescriptor {
            rank,
            descriptor: AppDescriptor {
                application_name: image.to_string(),
                image_url: image.to_string(),
                image_version: version.to_string(),
                expose_http_port: port,
                ..Default::default()
            },
        }
    }

    #[test]
    fn lowest_rank_wins_regardless_of_arrival_order() {
        let merged = merge(vec![ranked(1, "app", "1.0", 9000), ranked(0, "app", "1.0", 8000)]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].expose_http_port, 8000);

        let merged = merge(vec![ranked(0, "app", "1.0", 8000), ranked(1, "app", "1.0", 9000)]);
        assert_eq!(merged[0].expose_http_port, 8000);
    }

    #[test]
    fn equal_rank_keeps_last_seen() {
        let merged = merge(vec![ranked(0, "app", "1.0", 8000), ranked(0, "app", "1.0", 8001)]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].expose_http_port, 8001);
    }

    #[test]
    fn blank_version_is_the_same_identity_as_latest() {
        let merged = merge(vec![ranked(2, "app", "", 1), ranked(1, "app", "latest", 2)]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].expose_http_port, 2);
    }

    #[test]
    fn distinct_versions_are_kept() {
        let merged = merge(vec![
            ranked(0, "app", "1.0", 1),
            ranked(0, "app", "2.0", 2),
            ranked(1, "other", "1.0", 3),
        ]);
        assert_eq!(merged.len(), 3);
    }
}
