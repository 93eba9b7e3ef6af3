//! Environment-driven configuration.
//!
//! Everything is read once at startup. Required keys that are unset, empty or
//! whitespace-only produce [`Error::Configuration`], which aborts the run
//! before any repository is touched.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::iter::Peekable;
use std::path::PathBuf;
use std::str::Chars;

pub const VAULT_PATH: &str = "VAULT_PATH";
pub const GIT_AUTHOR_NAME: &str = "GIT_AUTHOR_NAME";
pub const GIT_AUTHOR_EMAIL: &str = "GIT_AUTHOR_EMAIL";
pub const SENDGRID_API_KEY: &str = "SENDGRID_API_KEY";
pub const FROM_EMAIL: &str = "FROM_EMAIL";
pub const FROM_NAME: &str = "FROM_NAME";
pub const TO_EMAIL: &str = "TO_EMAIL";
pub const TO_NAME: &str = "TO_NAME";
pub const WRAP_MD_LINKS: &str = "WRAP_MD_LINKS";
pub const PATHS_CHANGELOG: &str = "PATHS_CHANGELOG";
/// Older name for the override table; read when `PATHS_CHANGELOG` is unset.
pub const PATHS_CHANGELOG_PY: &str = "PATHS_CHANGELOG_PY";
pub const STAGE: &str = "STAGE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mailbox {
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitIdentity {
    pub name: String,
    pub email: String,
}

/// One entry of the `PATHS_CHANGELOG` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ChangelogOverride {
    /// `{"repo": "notes", "subpath": "/Resources/Notes"}`
    Record(OverrideRecord),
    /// Legacy form: a path containing the repository name, e.g.
    /// `"/Resources/Notes/notes"`. The name is cut out to get the subpath.
    Legacy(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OverrideRecord {
    pub repo: String,
    pub subpath: String,
}

impl ChangelogOverride {
    /// Subpath below the repository root, if this override applies to `repo_name`.
    pub fn subpath_for(&self, repo_name: &str) -> Option<String> {
        match self {
            ChangelogOverride::Record(record) if record.repo == repo_name => {
                Some(record.subpath.clone())
            }
            ChangelogOverride::Record(_) => None,
            ChangelogOverride::Legacy(path)
                if !repo_name.is_empty() && path.contains(repo_name) =>
            {
                Some(path.replace(repo_name, ""))
            }
            ChangelogOverride::Legacy(_) => None,
        }
    }
}

pub fn parse_overrides(raw: &str) -> Result<Vec<ChangelogOverride>> {
    parse_overrides_from(PATHS_CHANGELOG, raw)
}

/// A JSON override list, or failing that a legacy `['/Meta/notes', ...]`
/// list of quoted strings.
fn parse_overrides_from(key: &str, raw: &str) -> Result<Vec<ChangelogOverride>> {
    let json_err = match serde_json::from_str(raw) {
        Ok(overrides) => return Ok(overrides),
        Err(e) => e,
    };

    parse_legacy_list(raw)
        .map(|paths| paths.into_iter().map(ChangelogOverride::Legacy).collect())
        .ok_or_else(|| {
            Error::Configuration(format!(
                "{} must be a JSON override list or a legacy ['/sub/path/<repo>', ...] \
                 string list: {}",
                key, json_err
            ))
        })
}

fn skip_whitespace(chars: &mut Peekable<Chars<'_>>) {
    while chars.peek().is_some_and(|c| c.is_whitespace()) {
        chars.next();
    }
}

/// Only single- or double-quoted strings separated by commas are accepted.
fn parse_legacy_list(raw: &str) -> Option<Vec<String>> {
    let mut chars = raw.trim().chars().peekable();
    if chars.next()? != '[' {
        return None;
    }

    let mut items = Vec::new();
    skip_whitespace(&mut chars);
    if chars.peek() == Some(&']') {
        chars.next();
    } else {
        loop {
            skip_whitespace(&mut chars);
            let quote = chars.next()?;
            if quote != '\'' && quote != '"' {
                return None;
            }

            let mut item = String::new();
            loop {
                match chars.next()? {
                    '\\' => item.push(chars.next()?),
                    c if c == quote => break,
                    c => item.push(c),
                }
            }
            items.push(item);

            skip_whitespace(&mut chars);
            match chars.next()? {
                ',' => {
                    skip_whitespace(&mut chars);
                    if chars.peek() == Some(&']') {
                        chars.next();
                        break;
                    }
                }
                ']' => break,
                _ => return None,
            }
        }
    }

    if chars.next().is_some() {
        return None;
    }
    Some(items)
}

pub fn parse_flag(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(Error::Configuration(format!(
            "{} must be a boolean, got '{}'",
            key, other
        ))),
    }
}

/// `true` when `STAGE=dev`.
pub fn is_dev_stage<F>(lookup: F) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    lookup(STAGE).map(|s| s.trim() == "dev").unwrap_or(false)
}

#[derive(Debug, Clone)]
pub struct Config {
    pub vault_path: PathBuf,
    pub git_identity: GitIdentity,
    pub sendgrid_api_key: String,
    pub sender: Mailbox,
    pub recipient: Mailbox,
    pub wrap_md_links: bool,
    pub changelog_overrides: Vec<ChangelogOverride>,
    pub debug: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| -> Option<String> {
            lookup(key).filter(|value| !value.trim().is_empty())
        };
        let require =
            |key: &str| -> Result<String> { get(key).ok_or_else(|| Error::missing_env(key)) };

        let wrap_md_links = match get(WRAP_MD_LINKS) {
            Some(raw) => parse_flag(WRAP_MD_LINKS, &raw)?,
            None => false,
        };
        let changelog_overrides = match (get(PATHS_CHANGELOG), get(PATHS_CHANGELOG_PY)) {
            (Some(raw), _) => parse_overrides_from(PATHS_CHANGELOG, &raw)?,
            (None, Some(raw)) => parse_overrides_from(PATHS_CHANGELOG_PY, &raw)?,
            (None, None) => Vec::new(),
        };

        Ok(Self {
            vault_path: PathBuf::from(require(VAULT_PATH)?),
            git_identity: GitIdentity {
                name: require(GIT_AUTHOR_NAME)?,
                email: require(GIT_AUTHOR_EMAIL)?,
            },
            sendgrid_api_key: require(SENDGRID_API_KEY)?,
            sender: Mailbox {
                email: require(FROM_EMAIL)?,
                name: require(FROM_NAME)?,
            },
            recipient: Mailbox {
                email: require(TO_EMAIL)?,
                name: require(TO_NAME)?,
            },
            wrap_md_links,
            changelog_overrides,
            debug: is_dev_stage(&lookup),
        })
    }
}
