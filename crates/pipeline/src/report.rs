//! Per-run accumulator of what the pipeline saw and skipped

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Summary of one pipeline run.
///
/// Owned by a single run and returned by the driver; nothing here is global.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrawlReport {
    /// Repositories turned into project nodes
    repositories_processed: usize,
    /// Repository documents that could not be used
    repositories_skipped: Vec<String>,
    /// Extensions of every listed file, before filtering
    extensions_seen: BTreeSet<String>,
    /// Files removed by the filter
    files_dropped: usize,
    /// Retained files with no matching content block
    content_misses: usize,
    /// Nodes left without an embedding
    embedding_failures: usize,
    /// Metadata lookups that failed or were skipped
    metadata_failures: usize,
    /// Projects without a detail record
    missing_details: Vec<String>,
}

impl CrawlReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn repositories_processed(&self) -> usize {
        self.repositories_processed
    }

    pub fn repositories_skipped(&self) -> &[String] {
        &self.repositories_skipped
    }

    pub fn extensions_seen(&self) -> &BTreeSet<String> {
        &self.extensions_seen
    }

    pub fn files_dropped(&self) -> usize {
        self.files_dropped
    }

    pub fn content_misses(&self) -> usize {
        self.content_misses
    }

    pub fn embedding_failures(&self) -> usize {
        self.embedding_failures
    }

    pub fn metadata_failures(&self) -> usize {
        self.metadata_failures
    }

    pub fn missing_details(&self) -> &[String] {
        &self.missing_details
    }

    pub(crate) fn record_processed(&mut self) {
        self.repositories_processed += 1;
    }

    pub(crate) fn record_skipped(&mut self, repo: impl Into<String>) {
        self.repositories_skipped.push(repo.into());
    }

    pub(crate) fn record_extension(&mut self, ext: impl Into<String>) {
        self.extensions_seen.insert(ext.into());
    }

    pub(crate) fn add_files_dropped(&mut self, count: usize) {
        self.files_dropped += count;
    }

    pub(crate) fn add_content_misses(&mut self, count: usize) {
        self.content_misses += count;
    }

    pub(crate) fn add_embedding_failures(&mut self, count: usize) {
        self.embedding_failures += count;
    }

    pub(crate) fn add_metadata_failures(&mut self, count: usize) {
        self.metadata_failures += count;
    }

    pub(crate) fn record_missing_details(&mut self, project: impl Into<String>) {
        self.missing_details.push(project.into());
    }

    /// Merge another report into this one
    pub fn merge(&mut self, other: CrawlReport) {
        self.repositories_processed += other.repositories_processed;
        self.repositories_skipped.extend(other.repositories_skipped);
        self.extensions_seen.extend(other.extensions_seen);
        self.files_dropped += other.files_dropped;
        self.content_misses += other.content_misses;
        self.embedding_failures += other.embedding_failures;
        self.metadata_failures += other.metadata_failures;
        self.missing_details.extend(other.missing_details);
    }
}

impl std::fmt::Display for CrawlReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Repositories processed: {}", self.repositories_processed)?;
        if !self.repositories_skipped.is_empty() {
            writeln!(
                f,
                "Repositories skipped: {}",
                self.repositories_skipped.join(", ")
            )?;
        }
        writeln!(f, "Files dropped by filter: {}", self.files_dropped)?;
        writeln!(f, "Files without content: {}", self.content_misses)?;
        writeln!(f, "Embedding failures: {}", self.embedding_failures)?;
        writeln!(f, "Metadata failures: {}", self.metadata_failures)?;
        if !self.missing_details.is_empty() {
            writeln!(
                f,
                "Projects without details: {}",
                self.missing_details.join(", ")
            )?;
        }
        let extensions: Vec<&str> = self.extensions_seen.iter().map(String::as_str).collect();
        write!(f, "Extensions seen: {}", extensions.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_merge() {
        let mut first = CrawlReport::new();
        first.record_processed();
        first.record_extension(".py");
        first.add_files_dropped(2);

        let mut second = CrawlReport::new();
        second.record_processed();
        second.record_skipped("broken");
        second.record_extension(".py");
        second.record_extension(".md");
        second.add_embedding_failures(1);

        first.merge(second);

        assert_eq!(first.repositories_processed(), 2);
        assert_eq!(first.repositories_skipped(), ["broken".to_string()]);
        assert_eq!(first.extensions_seen().len(), 2);
        assert_eq!(first.files_dropped(), 2);
        assert_eq!(first.embedding_failures(), 1);
    }

    #[test]
    fn test_merge_with_empty_is_identity() {
        let mut report = CrawlReport::new();
        report.add_content_misses(3);
        let before = report.clone();
        report.merge(CrawlReport::default());
        assert_eq!(report, before);
    }
}
