//! `advisory-lint` entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use advisory_lint::repository::HttpRepositoryFactory;
use advisory_lint::{report, walk, ValidatorConfig, Validator};
use anyhow::Context;
use clap::Parser;

/// Validates a tree of Composer security advisories.
///
/// Exits with the number of advisories that have at least one error
/// (capped at 255); zero means every advisory is valid.
#[derive(Parser, Debug)]
#[command(name = "advisory-lint", version, about)]
struct Cli {
    /// Root directory of the advisories database.
    #[arg(default_value = ".")]
    root: PathBuf,

    /// Repository used for records without `composer-repository`.
    #[arg(long, value_name = "URI")]
    repository: Option<String>,

    /// Timeout for repository requests, in seconds.
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = ValidatorConfig::from_env()?;
    if let Some(raw) = &cli.repository {
        config = config.with_default_repository(advisory_lint::config::parse_repository_url(raw)?);
    }
    if let Some(secs) = cli.timeout {
        config = config.with_timeout_secs(secs);
    }

    let records = walk::discover(&cli.root)
        .with_context(|| format!("discovering advisories in {}", cli.root.display()))?;

    let factory = HttpRepositoryFactory::new(&config)?;
    let mut validator = Validator::new(factory, &config);
    let findings = validator.validate_all(&records).await?;

    print!("{}", report::render(&findings));

    let failed = findings.failed_records().min(u8::MAX as usize) as u8;
    Ok(ExitCode::from(failed))
}
