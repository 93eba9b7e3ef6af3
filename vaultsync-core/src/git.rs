//! External commands run against a repository.
//!
//! [`ShellGitRunner`] spawns `git` and `make` with argument vectors inside the
//! repository directory. Every command's exit status is checked; a non-zero
//! exit becomes [`Error::CommandFailed`].

use crate::config::GitIdentity;
use crate::error::{Error, Result};
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;

pub const REMOTE: &str = "origin";
pub const BRANCH: &str = "master";
pub const CHANGELOG_COMMIT_MESSAGE: &str = "Changelog update";

pub trait GitRunner {
    /// `git status --porcelain`, untracked files included.
    fn status_porcelain(&self, repo: &Path) -> Result<String>;

    /// `git config user.name` / `git config user.email`.
    fn set_identity(&self, repo: &Path, identity: &GitIdentity) -> Result<()>;

    /// The repository's own commit procedure (`make commit`). What it commits
    /// is up to the repository; on success a new commit exists at `HEAD`.
    fn commit_procedure(&self, repo: &Path) -> Result<()>;

    /// Full hash of `HEAD`.
    fn head_hash(&self, repo: &Path) -> Result<String>;

    fn add(&self, repo: &Path, path: &Path) -> Result<()>;

    fn commit(&self, repo: &Path, message: &str) -> Result<()>;

    fn push(&self, repo: &Path, remote: &str, branch: &str) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct ShellGitRunner;

impl ShellGitRunner {
    pub fn new() -> Self {
        Self
    }

    fn run(&self, repo: &Path, program: &str, args: &[&str]) -> Result<String> {
        let command_line = format!("{} {}", program, args.join(" "));

        let mut cmd = Command::new(program);
        cmd.args(args)
            .current_dir(repo)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        debug!(repo = %repo.display(), "Running {}", command_line);

        let output = cmd.output().map_err(|source| Error::CommandSpawn {
            command: command_line.clone(),
            source,
        })?;

        if !output.status.success() {
            return Err(Error::CommandFailed {
                command: command_line,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    fn git(&self, repo: &Path, args: &[&str]) -> Result<String> {
        self.run(repo, "git", args)
    }
}

impl GitRunner for ShellGitRunner {
    fn status_porcelain(&self, repo: &Path) -> Result<String> {
        // Keep non-ASCII note names readable instead of octal-escaped.
        self.git(repo, &["-c", "core.quotePath=false", "status", "--porcelain"])
    }

    fn set_identity(&self, repo: &Path, identity: &GitIdentity) -> Result<()> {
        self.git(repo, &["config", "user.name", &identity.name])?;
        self.git(repo, &["config", "user.email", &identity.email])?;
        Ok(())
    }

    fn commit_procedure(&self, repo: &Path) -> Result<()> {
        self.run(repo, "make", &["commit"])?;
        Ok(())
    }

    fn head_hash(&self, repo: &Path) -> Result<String> {
        let out = self.git(repo, &["log", "-1", "--format=format:%H"])?;
        Ok(out.trim().to_string())
    }

    fn add(&self, repo: &Path, path: &Path) -> Result<()> {
        let path = path.to_string_lossy();
        self.git(repo, &["add", "--", path.as_ref()])?;
        Ok(())
    }

    fn commit(&self, repo: &Path, message: &str) -> Result<()> {
        self.git(repo, &["commit", "-m", message])?;
        Ok(())
    }

    fn push(&self, repo: &Path, remote: &str, branch: &str) -> Result<()> {
        self.git(repo, &["push", remote, branch])?;
        Ok(())
    }
}
