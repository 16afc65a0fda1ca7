//! Runs the retention engine over every configured repository.

use chrono::Utc;
use futures::stream::{self, StreamExt};
use regprune_core::RetentionPolicy;
use regprune_registry::Registry;

use crate::engine::RetentionEngine;
use crate::report::RunReport;

/// Default number of repositories processed at the same time.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Drives a [`RetentionEngine`] over a whole [`RetentionPolicy`].
///
/// Repositories are independent, so up to `concurrency` of them are in
/// flight at once. Within a repository, tags are still processed one at a
/// time, oldest first.
#[derive(Debug, Clone)]
pub struct Runner<R> {
    engine: RetentionEngine<R>,
    concurrency: usize,
}

impl<R: Registry> Runner<R> {
    /// Creates a runner with [`DEFAULT_CONCURRENCY`].
    #[must_use]
    pub const fn new(engine: RetentionEngine<R>) -> Self {
        Self {
            engine,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Sets how many repositories may be processed concurrently (at least 1).
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Returns the configured concurrency.
    #[must_use]
    pub const fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Returns the engine.
    #[must_use]
    pub const fn engine(&self) -> &RetentionEngine<R> {
        &self.engine
    }

    /// Processes every rule and returns the aggregated report.
    ///
    /// Never fails: repository and tag failures are part of the report.
    pub async fn run(&self, policy: &RetentionPolicy) -> RunReport {
        let started_at = Utc::now();
        tracing::info!(
            repositories = policy.len(),
            rejected_rules = policy.rejected().len(),
            concurrency = self.concurrency,
            dry_run = self.engine.is_dry_run(),
            "starting clean up"
        );

        let repositories = stream::iter(policy.rules())
            .map(|rule| self.engine.process(rule))
            .buffer_unordered(self.concurrency)
            .collect::<Vec<_>>()
            .await;

        let report = RunReport::new(
            started_at,
            Utc::now(),
            self.engine.is_dry_run(),
            repositories,
            policy.rejected().to_vec(),
        );

        tracing::info!(
            repositories = report.totals.repositories,
            failed_repositories = report.totals.failed_repositories,
            attempted = report.totals.attempted,
            deleted = report.totals.deleted,
            retained = report.totals.retained,
            unresolved = report.totals.unresolved,
            skipped_non_numeric = report.totals.skipped_non_numeric,
            "clean up finished"
        );

        report
    }
}
