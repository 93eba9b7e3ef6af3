use colored::Colorize;
use vaultsync_core::{RepoOutcome, RunReport};

pub fn print_report(report: &RunReport) {
    if report.repositories_seen() == 0 {
        println!("{}", "No repositories found in vault".yellow());
        return;
    }

    println!("{}", "Vault Sync".bold().cyan());
    println!();

    for (repo, outcome) in report.outcomes() {
        match outcome {
            RepoOutcome::Clean => {
                println!("  {} {}", "=".dimmed(), repo.name.dimmed());
            }
            RepoOutcome::NothingActionable => {
                println!(
                    "  {} {} {}",
                    "~".yellow(),
                    repo.name,
                    "(only changelog changed)".dimmed()
                );
            }
            RepoOutcome::Published {
                commit_hash,
                entries,
                ..
            } => {
                let short = commit_hash.get(..7).unwrap_or(commit_hash);
                println!(
                    "  {} {} {} {}",
                    "✓".green().bold(),
                    repo.name.bold(),
                    short.yellow(),
                    format!("({} file(s))", entries.len()).dimmed()
                );
            }
        }
    }

    for (repo, reason) in report.failures() {
        println!("  {} {}: {}", "✗".red().bold(), repo.name.bold(), reason.red());
    }

    println!();
    println!(
        "  {}: {}  {}: {}",
        "Published".bold(),
        report.published().count().to_string().green(),
        "Failed".bold(),
        report.failures().len().to_string().red()
    );
}
