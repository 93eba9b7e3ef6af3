//! The per-repository commit, changelog and push workflow.
//!
//! For a dirty repository with at least one reportable change:
//!
//! 1. mail a notice if anything was deleted (best-effort),
//! 2. set the commit identity and run the repository's commit procedure,
//! 3. read back the hash of `HEAD`,
//! 4. prepend a dated entry to the repository changelog,
//! 5. commit the changelog on its own and push to `origin master`.
//!
//! Steps are not rolled back. A failure part way leaves the repository for
//! the next run to pick up.

use crate::changelog;
use crate::clock::Clock;
use crate::config::Config;
use crate::error::Result;
use crate::git::{GitRunner, BRANCH, CHANGELOG_COMMIT_MESSAGE, REMOTE};
use crate::models::{ChangeEntry, RepoOutcome, RepositoryTarget, RunReport};
use crate::notify::Notifier;
use crate::scanner;
use crate::status;
use tracing::{debug, error, info, warn};

pub struct Publisher<'a> {
    config: &'a Config,
    git: &'a dyn GitRunner,
    notifier: &'a dyn Notifier,
    clock: &'a dyn Clock,
}

impl<'a> Publisher<'a> {
    pub fn new(
        config: &'a Config,
        git: &'a dyn GitRunner,
        notifier: &'a dyn Notifier,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            config,
            git,
            notifier,
            clock,
        }
    }

    /// Scan the vault and publish every candidate repository in turn.
    ///
    /// Only a failure to list the vault is returned as an error; per-repository
    /// failures are logged and collected in the report.
    pub fn run(&self) -> Result<RunReport> {
        let mut report = RunReport::default();

        for repo in scanner::list_candidates(&self.config.vault_path)? {
            match self.publish_repository(&repo) {
                Ok(outcome) => report.record(repo, outcome),
                Err(e) => {
                    error!(repo = %repo.name, "Repository left unpublished: {}", e);
                    report.record_failure(repo, e.to_string());
                }
            }
        }

        Ok(report)
    }

    /// Reportable changes in `repo`, or `None` if its working tree is clean.
    pub fn classify(&self, repo: &RepositoryTarget) -> Result<Option<Vec<ChangeEntry>>> {
        let porcelain = self.git.status_porcelain(repo.root())?;
        if porcelain.trim().is_empty() {
            return Ok(None);
        }

        debug!(repo = %repo.name, "Repo '{}' has changes and needs a commit", repo.name);
        Ok(Some(status::classify(&porcelain, self.config.wrap_md_links)))
    }

    pub fn publish_repository(&self, repo: &RepositoryTarget) -> Result<RepoOutcome> {
        let entries = match self.classify(repo)? {
            None => return Ok(RepoOutcome::Clean),
            Some(entries) if entries.is_empty() => {
                debug!(repo = %repo.name, "Dirty, but nothing besides the changelog changed");
                return Ok(RepoOutcome::NothingActionable);
            }
            Some(entries) => entries,
        };

        info!(repo = %repo.name, "Changes to {} file(s) will be committed", entries.len());

        let deleted: Vec<ChangeEntry> = entries
            .iter()
            .filter(|e| e.is_deleted())
            .cloned()
            .collect();
        if !deleted.is_empty() && !self.notifier.notify_deletions(&repo.name, &deleted) {
            warn!(repo = %repo.name, "Email about deleted files could not be sent");
        }

        let status_block = changelog::format_status_block(self.clock.now(), &entries);

        self.git.set_identity(repo.root(), &self.config.git_identity)?;
        self.git.commit_procedure(repo.root())?;
        let commit_hash = self.git.head_hash(repo.root())?;

        let changelog_path = changelog::resolve_path(repo, &self.config.changelog_overrides)?;
        changelog::prepend(
            &changelog_path,
            &changelog::format_entry(&status_block, &commit_hash),
        )?;

        debug!(
            repo = %repo.name,
            "Changelog commit: {} then push {} {}",
            changelog_path.display(),
            REMOTE,
            BRANCH
        );
        self.git.add(repo.root(), &changelog_path)?;
        self.git.commit(repo.root(), CHANGELOG_COMMIT_MESSAGE)?;
        self.git.push(repo.root(), REMOTE, BRANCH)?;

        info!(repo = %repo.name, commit = %commit_hash, "Published");

        Ok(RepoOutcome::Published {
            commit_hash,
            changelog: changelog_path,
            entries,
        })
    }
}
