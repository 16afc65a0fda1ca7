//! Check command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use regprune_core::load_policy;

/// Arguments for the check command.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Retention rules file (`repository = count` per line)
    #[arg(short, long, env = "RETENTION_CONFIG", default_value = "config.properties")]
    pub config: PathBuf,
}

/// Runs the check command.
///
/// # Errors
///
/// Returns an error if the file cannot be read or contains malformed rules.
pub fn run(args: &CheckArgs) -> Result<()> {
    info!(path = %args.config.display(), "Checking retention rules");

    let policy = load_policy(&args.config).with_context(|| {
        format!(
            "Failed to load retention rules from {}",
            args.config.display()
        )
    })?;

    println!("Retention rules: {}", args.config.display());
    for rule in policy.rules() {
        println!("  ✓ {} keeps {}", rule.repository, rule.keep_count);
    }
    for rejected in policy.rejected() {
        println!(
            "  ✗ {} = '{}': {}",
            rejected.repository, rejected.value, rejected.reason
        );
    }

    if !policy.rejected().is_empty() {
        anyhow::bail!("{} invalid retention rule(s)", policy.rejected().len());
    }

    println!("\n✓ {} rule(s) valid", policy.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn config_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_check_valid_config() {
        let file = config_file("# rules\napps/web = 3\napps/api=10\n");
        let args = CheckArgs {
            config: file.path().to_path_buf(),
        };
        assert!(run(&args).is_ok());
    }

    #[test]
    fn test_check_reports_malformed_rules() {
        let file = config_file("apps/web = 3\napps/api = ten\n");
        let args = CheckArgs {
            config: file.path().to_path_buf(),
        };
        let err = run(&args).unwrap_err();
        assert!(err.to_string().contains("1 invalid retention rule"));
    }
}
