//! # regprune Engine
//!
//! Applies retention rules to a registry.
//!
//! - [`RetentionEngine`] handles one repository: list tags, select the
//!   oldest numeric tags beyond the retention count, then resolve and delete
//!   each one.
//! - [`Runner`] drives the engine over every rule of a
//!   [`RetentionPolicy`](regprune_core::RetentionPolicy) with bounded
//!   concurrency and produces a [`RunReport`].
//!
//! Failures never cross a tag or repository boundary: a tag that cannot be
//! resolved or deleted is recorded and the next one is tried, and a
//! repository whose tags cannot be listed is recorded and the next
//! repository is processed.
//!
//! ## Example
//!
//! ```rust,no_run
//! use regprune_core::RetentionPolicy;
//! use regprune_engine::{RetentionEngine, Runner};
//! use regprune_registry::{RegistryClient, RegistryConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = RegistryClient::new(RegistryConfig::new("https://registry.example.com/v2"))?;
//!     let policy = RetentionPolicy::parse("apps/web = 10\n");
//!
//!     let report = Runner::new(RetentionEngine::new(client)).run(&policy).await;
//!     println!("deleted {} manifests", report.totals.deleted);
//!     Ok(())
//! }
//! ```

#![deny(missing_docs)]
#![warn(clippy::pedantic)]

mod engine;
mod report;
mod runner;

#[cfg(test)]
mod fake;

pub use engine::RetentionEngine;
pub use report::{PurgeReport, RepositoryReport, RunReport, RunTotals, TagOutcome, TagReport};
pub use runner::{Runner, DEFAULT_CONCURRENCY};
