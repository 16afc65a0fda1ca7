//! Per-repository retention processing.

use regprune_core::{select_for_deletion, NumericTag, RetentionRule, Selection};
use regprune_registry::Registry;
use tracing::Instrument;

use crate::report::{PurgeReport, RepositoryReport, TagOutcome};

/// Applies a retention rule to one repository at a time.
///
/// The engine holds no state between calls; running it again after a
/// successful cleanup finds nothing left to delete.
#[derive(Debug, Clone)]
pub struct RetentionEngine<R> {
    registry: R,
    dry_run: bool,
}

impl<R: Registry> RetentionEngine<R> {
    /// Creates an engine backed by the given registry.
    #[must_use]
    pub const fn new(registry: R) -> Self {
        Self {
            registry,
            dry_run: false,
        }
    }

    /// In dry-run mode candidates are selected and reported, but no digest
    /// lookup or delete request is sent.
    #[must_use]
    pub const fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Returns whether this engine skips deletions.
    #[must_use]
    pub const fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Returns the underlying registry.
    #[must_use]
    pub const fn registry(&self) -> &R {
        &self.registry
    }

    /// Selects the tags outside the retention window.
    ///
    /// See [`regprune_core::select_for_deletion`].
    #[must_use]
    pub fn select_for_deletion<S: AsRef<str>>(&self, tags: &[S], keep_count: u32) -> Selection {
        select_for_deletion(tags, keep_count)
    }

    /// Resolves and deletes each candidate, oldest first.
    ///
    /// Every candidate is attempted exactly once. A failure on one tag is
    /// recorded and the next candidate is tried.
    pub async fn purge(&self, repository: &str, candidates: &[NumericTag]) -> PurgeReport {
        let mut report = PurgeReport::new(repository);

        for tag in candidates {
            let outcome = self.purge_tag(repository, tag).await;
            report.record(tag, outcome);
        }

        tracing::info!(
            repository,
            attempted = report.attempted(),
            deleted = report.deleted(),
            retained = report.retained(),
            unresolved = report.unresolved(),
            "purge complete"
        );

        report
    }

    async fn purge_tag(&self, repository: &str, tag: &NumericTag) -> TagOutcome {
        let digest = match self.registry.get_digest(repository, tag.as_str()).await {
            Ok(digest) => digest,
            Err(err) => {
                tracing::warn!(
                    repository,
                    tag = %tag,
                    operation = "get_digest",
                    error = %err,
                    "could not resolve digest, skipping tag"
                );
                return TagOutcome::Unresolved {
                    status: err.status(),
                    reason: err.to_string(),
                };
            }
        };

        match self.registry.delete_manifest(repository, &digest).await {
            Ok(()) => {
                tracing::info!(repository, tag = %tag, digest = %digest, "digest deleted");
                TagOutcome::Deleted { digest }
            }
            Err(err) => {
                if err.is_transport() {
                    tracing::warn!(
                        repository,
                        tag = %tag,
                        digest = %digest,
                        operation = "delete_manifest",
                        error = %err,
                        "delete request failed"
                    );
                } else {
                    tracing::info!(
                        repository,
                        tag = %tag,
                        digest = %digest,
                        status = err.status(),
                        "manifest is waiting for garbage collection or cannot be deleted"
                    );
                }
                TagOutcome::Retained {
                    digest,
                    status: err.status(),
                    reason: err.to_string(),
                }
            }
        }
    }

    /// Lists, selects and purges one repository.
    ///
    /// A listing failure is recorded in the returned report instead of
    /// being propagated.
    pub async fn process(&self, rule: &RetentionRule) -> RepositoryReport {
        let span = tracing::info_span!("repository", repository = %rule.repository);
        self.process_inner(rule).instrument(span).await
    }

    async fn process_inner(&self, rule: &RetentionRule) -> RepositoryReport {
        let repository = rule.repository.as_str();
        tracing::info!(
            repository,
            keep = rule.keep_count,
            "deleting all but the most recent tags"
        );

        let tags = match self.registry.list_tags(repository).await {
            Ok(tags) => tags,
            Err(err) => {
                tracing::error!(
                    repository,
                    operation = "list_tags",
                    error = %err,
                    "could not list tags, skipping repository"
                );
                return RepositoryReport::failed(rule, err.to_string());
            }
        };

        let selection = self.select_for_deletion(&tags, rule.keep_count);
        if selection.is_satisfied() {
            tracing::info!(
                repository,
                numeric_tags = selection.numeric_count(),
                "retention already satisfied"
            );
        }

        if self.dry_run {
            for candidate in &selection.candidates {
                tracing::info!(repository, tag = %candidate, "would delete");
            }
            return RepositoryReport::planned(rule, tags.len(), &selection);
        }

        let purge = self.purge(repository, &selection.candidates).await;
        RepositoryReport::completed(rule, tags.len(), &selection, purge)
    }
}
