//! # vaultsync-core
//!
//! Core library for vaultsync - finds the git repositories inside a notes
//! vault, classifies their uncommitted changes, commits them, keeps a
//! changelog per repository and pushes the result.
//!
//! External effects sit behind small traits ([`GitRunner`], [`MailTransport`],
//! [`Clock`]) so the workflow can be driven against fakes.

pub mod changelog;
pub mod clock;
pub mod config;
pub mod error;
pub mod git;
pub mod models;
pub mod notify;
pub mod publish;
pub mod scanner;
pub mod status;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ChangelogOverride, Config, GitIdentity, Mailbox};
pub use error::{Error, Result};
pub use git::{GitRunner, ShellGitRunner};
pub use models::{ChangeEntry, RepoOutcome, RepositoryTarget, RunReport, StatusCode};
pub use notify::{DeletionNotifier, EmailNotification, MailTransport, Notifier};
pub use publish::Publisher;
