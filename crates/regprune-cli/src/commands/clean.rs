//! Clean command implementation.
//!
//! Loads the retention rules, then deletes the oldest numeric tags of every
//! configured repository.

use std::fmt::Write as _;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{builder::BoolishValueParser, Args, ValueEnum};
use tracing::info;

use regprune_core::load_policy;
use regprune_engine::{RepositoryReport, RetentionEngine, RunReport, Runner, DEFAULT_CONCURRENCY};
use regprune_registry::{RegistryAuth, RegistryClient, RegistryConfig};

/// Report output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human readable summary
    Text,
    /// Full report as JSON
    Json,
}

/// Arguments for the clean command.
#[derive(Args, Debug)]
pub struct CleanArgs {
    /// Registry API root including /v2 (e.g., `<https://registry.example.com/v2>`)
    #[arg(short, long, env = "REGISTRY_HOST")]
    pub registry: String,

    /// Skip TLS certificate verification
    #[arg(long, env = "INSECURE_REGISTRY", value_parser = BoolishValueParser::new())]
    pub insecure: bool,

    /// Retention rules file (`repository = count` per line)
    #[arg(short, long, env = "RETENTION_CONFIG", default_value = "config.properties")]
    pub config: PathBuf,

    /// Request timeout in seconds
    #[arg(long, env = "REGISTRY_TIMEOUT", default_value = "10")]
    pub timeout: u64,

    /// Number of repositories processed concurrently
    #[arg(long, env = "REGPRUNE_CONCURRENCY", default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Bearer token for authentication
    #[arg(long, env = "REGISTRY_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Username for basic authentication
    #[arg(short, long, env = "REGISTRY_USERNAME")]
    pub username: Option<String>,

    /// Password for basic authentication
    #[arg(long, env = "REGISTRY_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Select tags but do not delete anything
    #[arg(long)]
    pub dry_run: bool,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Runs the clean command.
///
/// # Errors
///
/// Returns an error if:
/// - The retention configuration cannot be read
/// - The registry URL or credentials are invalid
///
/// Failures while talking to the registry are part of the report, not errors.
pub async fn run(args: &CleanArgs) -> Result<()> {
    let policy = load_policy(&args.config).with_context(|| {
        format!(
            "Failed to load retention rules from {}",
            args.config.display()
        )
    })?;

    let config = registry_config(args)?;
    info!(
        registry = %config.url,
        insecure = config.insecure,
        timeout_secs = config.timeout.as_secs(),
        rules = policy.len(),
        "starting registry cleanup"
    );

    let client = RegistryClient::new(config).context("Failed to create registry client")?;
    let engine = RetentionEngine::new(client).with_dry_run(args.dry_run);
    let report = Runner::new(engine)
        .with_concurrency(args.concurrency)
        .run(&policy)
        .await;

    match args.format {
        OutputFormat::Text => print!("{}", render_text(&report)),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?
        ),
    }

    Ok(())
}

/// Builds the registry configuration from CLI arguments.
fn registry_config(args: &CleanArgs) -> Result<RegistryConfig> {
    Ok(RegistryConfig::new(&args.registry)
        .with_timeout(Duration::from_secs(args.timeout))
        .with_insecure(args.insecure)
        .with_auth(determine_auth(args)?))
}

/// Determines the authentication method from CLI arguments.
fn determine_auth(args: &CleanArgs) -> Result<RegistryAuth> {
    if let Some(ref token) = args.token {
        return Ok(RegistryAuth::bearer(token));
    }

    if let (Some(ref username), Some(ref password)) = (&args.username, &args.password) {
        return Ok(RegistryAuth::basic(username, password));
    }

    if args.username.is_some() || args.password.is_some() {
        anyhow::bail!("Both --username and --password are required for basic authentication");
    }

    Ok(RegistryAuth::None)
}

/// Renders the human readable report.
fn render_text(report: &RunReport) -> String {
    let mut out = String::new();

    let mode = if report.dry_run { " (dry run)" } else { "" };
    let _ = writeln!(out, "Registry cleanup{mode}");
    let _ = writeln!(out, "================{}", "=".repeat(mode.len()));

    for repo in &report.repositories {
        let _ = writeln!(out, "{}", render_repository(repo, report.dry_run));
    }

    if !report.rejected_rules.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Rejected rules:");
        for rule in &report.rejected_rules {
            let _ = writeln!(out, "  {} = '{}': {}", rule.repository, rule.value, rule.reason);
        }
    }

    let t = &report.totals;
    let _ = writeln!(out);
    if report.dry_run {
        let _ = writeln!(
            out,
            "{} repositories, {} tags would be deleted, {} non-numeric tags skipped",
            t.repositories, t.planned, t.skipped_non_numeric
        );
    } else {
        let _ = writeln!(
            out,
            "{} repositories ({} failed): {} deleted, {} retained, {} unresolved, {} non-numeric tags skipped",
            t.repositories,
            t.failed_repositories,
            t.deleted,
            t.retained,
            t.unresolved,
            t.skipped_non_numeric
        );
    }

    out
}

fn render_repository(repo: &RepositoryReport, dry_run: bool) -> String {
    if let Some(ref error) = repo.error {
        return format!("  ✗ {} (keep {}): {error}", repo.repository, repo.keep_count);
    }

    if dry_run {
        let planned = if repo.planned.is_empty() {
            "nothing to delete".to_string()
        } else {
            format!("would delete {}", repo.planned.join(", "))
        };
        return format!(
            "  • {} (keep {}, {} tags): {planned}",
            repo.repository, repo.keep_count, repo.tags_found
        );
    }

    format!(
        "  ✓ {} (keep {}, {} tags): {} deleted, {} retained, {} unresolved, {} skipped",
        repo.repository,
        repo.keep_count,
        repo.tags_found,
        repo.deleted,
        repo.retained,
        repo.unresolved,
        repo.skipped_non_numeric
    )
}
