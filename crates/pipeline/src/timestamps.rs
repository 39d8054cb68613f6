//! Modification timestamps: parsing, file lookup and roll-up

use crate::links::strip_crawl_prefix;
use crate::metadata::RepositoryMetadata;
use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use repograph_core::node::{Node, NodeType};
use tracing::{debug, warn};

/// Parse an ISO-8601 timestamp.
///
/// Accepts RFC 3339 (`2024-01-02T03:04:05Z`, offsets) and naive
/// `YYYY-MM-DDTHH:MM:SS[.fff]`, which is read as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt);
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc().fixed_offset())
}

/// Seconds since the epoch, with sub-second precision
pub fn epoch_seconds(value: &str) -> Option<f64> {
    parse_timestamp(value).map(|dt| {
        let utc = dt.with_timezone(&Utc);
        utc.timestamp() as f64 + f64::from(utc.timestamp_subsec_nanos()) / 1e9
    })
}

/// The most recent of a set of timestamps, returned in its original text.
/// Unparseable values are ignored.
pub fn latest<'a>(values: impl IntoIterator<Item = &'a str>) -> Option<String> {
    values
        .into_iter()
        .filter_map(|v| parse_timestamp(v).map(|dt| (dt, v)))
        .max_by_key(|(dt, _)| *dt)
        .map(|(_, v)| v.to_string())
}

/// Most recent file timestamp anywhere below `node`
pub fn latest_in_subtree(node: &Node) -> Option<String> {
    latest(
        node.iter()
            .skip(1)
            .filter_map(|n| n.last_modified.as_deref()),
    )
}

/// Look up `last_modified` for every file node of a repository forest.
///
/// Lookups run one after another; the collaborator does its own pacing.
/// Failures leave the field absent and are counted in the return value.
pub async fn annotate_file_timestamps(
    nodes: &mut [Node],
    owner: &str,
    repo: &str,
    metadata: &dyn RepositoryMetadata,
) -> usize {
    let paths: Vec<String> = nodes
        .iter()
        .flat_map(|root| root.iter())
        .filter(|n| n.node_type == NodeType::File)
        .map(|n| strip_crawl_prefix(&n.path, owner, repo))
        .collect();

    let mut found = Vec::with_capacity(paths.len());
    let mut failures = 0;
    for path in &paths {
        match metadata.last_commit(repo, path).await {
            Ok(value) => {
                if value.is_none() {
                    debug!("No commit found for {repo}/{path}");
                }
                found.push(value);
            }
            Err(e) => {
                warn!("Commit lookup failed for {repo}/{path}: {e}");
                failures += 1;
                found.push(None);
            }
        }
    }

    let mut found = found.into_iter();
    for root in nodes.iter_mut() {
        root.walk_mut(&mut |node| {
            if node.node_type == NodeType::File {
                node.last_modified = found.next().flatten();
            }
        });
    }
    failures
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_variants() {
        assert!(parse_timestamp("2024-03-01T10:00:00Z").is_some());
        assert!(parse_timestamp("2024-03-01T10:00:00+02:00").is_some());
        assert!(parse_timestamp("2024-03-01T10:00:00.123456").is_some());
        assert!(parse_timestamp("yesterday").is_none());
        assert_eq!(
            epoch_seconds("1970-01-01T00:01:00Z"),
            Some(60.0)
        );
    }

    #[test]
    fn test_latest_compares_instants_not_text() {
        let values = [
            "2024-01-01T12:00:00+05:00",
            "2024-01-01T08:00:00Z",
            "garbage",
        ];
        assert_eq!(
            latest(values.iter().copied()),
            Some("2024-01-01T08:00:00Z".to_string())
        );
        assert_eq!(latest(["nope"].iter().copied()), None);
    }

    #[test]
    fn test_latest_in_subtree_ignores_self() {
        let mut project = Node::new("p", NodeType::Project);
        project.last_modified = Some("2030-01-01T00:00:00Z".to_string());
        let mut file = Node::file("a.py");
        file.last_modified = Some("2020-01-01T00:00:00Z".to_string());
        let mut dir = Node::directory("d");
        let mut nested = Node::file("b.py");
        nested.last_modified = Some("2021-06-01T00:00:00Z".to_string());
        dir.children.push(nested);
        project.children = vec![file, dir];

        assert_eq!(
            latest_in_subtree(&project),
            Some("2021-06-01T00:00:00Z".to_string())
        );
    }
}
