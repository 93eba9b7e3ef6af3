use anyhow::{Context, Result};
use clap::Parser;
use tracing::error;
use vaultsync_core::{config, Config, DeletionNotifier, Publisher, ShellGitRunner, SystemClock};
use vaultsync_mail::SendGridClient;

mod display;
mod logging;

/// Runs one full pass over the vault; meant to be started by a scheduler.
#[derive(Parser)]
#[command(name = "vaultsync")]
#[command(
    version,
    about = "Commit, changelog and push every git repository in a notes vault",
    long_about = None
)]
struct Cli {}

fn main() -> Result<()> {
    let _cli = Cli::parse();
    dotenvy::dotenv().ok();

    logging::init(config::is_dev_stage(|key| std::env::var(key).ok()));

    let config = Config::from_env()
        .inspect_err(|e| error!("{}", e))
        .context("Refusing to touch any repository")?;

    let git = ShellGitRunner::new();
    let notifier = DeletionNotifier::new(
        SendGridClient::new(config.sendgrid_api_key.clone()),
        config.sender.clone(),
        config.recipient.clone(),
    );
    let clock = SystemClock;

    let report = Publisher::new(&config, &git, &notifier, &clock)
        .run()
        .with_context(|| format!("Failed to scan vault {}", config.vault_path.display()))?;

    display::print_report(&report);

    if report.has_failures() {
        anyhow::bail!(
            "{} repository(ies) could not be published",
            report.failures().len()
        );
    }

    Ok(())
}
