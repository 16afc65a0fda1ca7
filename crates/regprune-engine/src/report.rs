//! Outcome reporting for cleanup runs.

use chrono::{DateTime, Utc};
use regprune_core::{NumericTag, RejectedRule, RetentionRule, Selection};
use serde::Serialize;

/// Terminal state of one deletion candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TagOutcome {
    /// The registry accepted the manifest deletion.
    Deleted {
        /// Digest that was deleted.
        digest: String,
    },

    /// The digest was resolved but the registry kept the manifest, either
    /// because it refused the delete or is deferring to garbage collection.
    Retained {
        /// Digest the delete was issued for.
        digest: String,
        /// HTTP status, when the registry answered.
        #[serde(skip_serializing_if = "Option::is_none")]
        status: Option<u16>,
        /// Why the manifest is still there.
        reason: String,
    },

    /// The tag could not be resolved to a digest, so no delete was issued.
    Unresolved {
        /// HTTP status, when the registry answered.
        #[serde(skip_serializing_if = "Option::is_none")]
        status: Option<u16>,
        /// Why resolution failed.
        reason: String,
    },
}

/// Outcome for one candidate tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagReport {
    /// Tag as reported by the registry.
    pub tag: String,

    /// What happened to it.
    #[serde(flatten)]
    pub outcome: TagOutcome,
}

/// Per-tag outcomes of purging one repository, in the order attempted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PurgeReport {
    /// Repository the candidates belong to.
    pub repository: String,

    /// One entry per attempted candidate.
    pub tags: Vec<TagReport>,
}

impl PurgeReport {
    /// Creates an empty report for a repository.
    #[must_use]
    pub fn new(repository: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            tags: Vec::new(),
        }
    }

    /// Records the outcome for a candidate.
    pub fn record(&mut self, tag: &NumericTag, outcome: TagOutcome) {
        self.tags.push(TagReport {
            tag: tag.as_str().to_string(),
            outcome,
        });
    }

    /// Number of candidates attempted.
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.tags.len()
    }

    /// Number of manifests deleted.
    #[must_use]
    pub fn deleted(&self) -> usize {
        self.count(|o| matches!(o, TagOutcome::Deleted { .. }))
    }

    /// Number of manifests the registry kept.
    #[must_use]
    pub fn retained(&self) -> usize {
        self.count(|o| matches!(o, TagOutcome::Retained { .. }))
    }

    /// Number of tags that could not be resolved.
    #[must_use]
    pub fn unresolved(&self) -> usize {
        self.count(|o| matches!(o, TagOutcome::Unresolved { .. }))
    }

    fn count(&self, pred: impl Fn(&TagOutcome) -> bool) -> usize {
        self.tags.iter().filter(|t| pred(&t.outcome)).count()
    }
}

/// Summary of one repository's cleanup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryReport {
    /// Repository name.
    pub repository: String,

    /// Configured retention count.
    pub keep_count: u32,

    /// Number of tags listed by the registry.
    pub tags_found: usize,

    /// Candidates for which a delete sequence was started.
    pub attempted: usize,

    /// Manifests deleted.
    pub deleted: usize,

    /// Manifests the registry kept.
    pub retained: usize,

    /// Candidates without a resolvable digest.
    pub unresolved: usize,

    /// Tags ignored because they are not integers.
    pub skipped_non_numeric: usize,

    /// Candidates selected but not attempted (dry run).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub planned: Vec<String>,

    /// The non-numeric tags that were ignored.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped_tags: Vec<String>,

    /// Per-tag outcomes.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<TagReport>,

    /// Repository-level failure, if the tags could not be listed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RepositoryReport {
    fn base(rule: &RetentionRule, tags_found: usize) -> Self {
        Self {
            repository: rule.repository.clone(),
            keep_count: rule.keep_count,
            tags_found,
            attempted: 0,
            deleted: 0,
            retained: 0,
            unresolved: 0,
            skipped_non_numeric: 0,
            planned: Vec::new(),
            skipped_tags: Vec::new(),
            tags: Vec::new(),
            error: None,
        }
    }

    /// Report for a repository whose candidates were purged.
    #[must_use]
    pub fn completed(
        rule: &RetentionRule,
        tags_found: usize,
        selection: &Selection,
        purge: PurgeReport,
    ) -> Self {
        Self {
            attempted: purge.attempted(),
            deleted: purge.deleted(),
            retained: purge.retained(),
            unresolved: purge.unresolved(),
            skipped_non_numeric: selection.skipped.len(),
            skipped_tags: selection.skipped.clone(),
            tags: purge.tags,
            ..Self::base(rule, tags_found)
        }
    }

    /// Report for a dry run: candidates are listed, nothing is attempted.
    #[must_use]
    pub fn planned(rule: &RetentionRule, tags_found: usize, selection: &Selection) -> Self {
        Self {
            planned: selection
                .candidates
                .iter()
                .map(|t| t.as_str().to_string())
                .collect(),
            skipped_non_numeric: selection.skipped.len(),
            skipped_tags: selection.skipped.clone(),
            ..Self::base(rule, tags_found)
        }
    }

    /// Report for a repository whose tags could not be listed.
    #[must_use]
    pub fn failed(rule: &RetentionRule, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::base(rule, 0)
        }
    }

    /// Returns true if the repository could not be processed.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Totals across all repositories of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunTotals {
    /// Repositories processed.
    pub repositories: usize,
    /// Repositories whose tags could not be listed.
    pub failed_repositories: usize,
    /// Candidates attempted.
    pub attempted: usize,
    /// Manifests deleted.
    pub deleted: usize,
    /// Manifests kept by the registry.
    pub retained: usize,
    /// Candidates without a resolvable digest.
    pub unresolved: usize,
    /// Non-numeric tags ignored.
    pub skipped_non_numeric: usize,
    /// Candidates listed by a dry run.
    pub planned: usize,
}

impl RunTotals {
    fn add(&mut self, report: &RepositoryReport) {
        self.repositories += 1;
        self.failed_repositories += usize::from(report.is_failed());
        self.attempted += report.attempted;
        self.deleted += report.deleted;
        self.retained += report.retained;
        self.unresolved += report.unresolved;
        self.skipped_non_numeric += report.skipped_non_numeric;
        self.planned += report.planned.len();
    }
}

/// Outcome of a whole cleanup run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// When the run started.
    pub started_at: DateTime<Utc>,

    /// When the last repository finished.
    pub finished_at: DateTime<Utc>,

    /// Whether deletions were skipped.
    pub dry_run: bool,

    /// Totals across repositories.
    pub totals: RunTotals,

    /// Per-repository reports, sorted by repository name.
    pub repositories: Vec<RepositoryReport>,

    /// Rules dropped while loading the configuration.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rejected_rules: Vec<RejectedRule>,
}

impl RunReport {
    /// Builds a run report; repositories are sorted by name.
    #[must_use]
    pub fn new(
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        dry_run: bool,
        mut repositories: Vec<RepositoryReport>,
        rejected_rules: Vec<RejectedRule>,
    ) -> Self {
        repositories.sort_by(|a, b| a.repository.cmp(&b.repository));

        let mut totals = RunTotals::default();
        for report in &repositories {
            totals.add(report);
        }

        Self {
            started_at,
            finished_at,
            dry_run,
            totals,
            repositories,
            rejected_rules,
        }
    }

    /// Returns the report for a repository.
    #[must_use]
    pub fn repository(&self, name: &str) -> Option<&RepositoryReport> {
        self.repositories.iter().find(|r| r.repository == name)
    }
}
