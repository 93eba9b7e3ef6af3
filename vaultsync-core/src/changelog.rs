//! Per-repository changelog files, newest entry first.

use crate::config::ChangelogOverride;
use crate::error::{Error, Result};
use crate::models::{ChangeEntry, RepositoryTarget};
use chrono::NaiveDateTime;
use std::fs::{self, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Conventional notes directory, relative to the repository root.
pub const NOTES_DIR: &str = "Resources/Notes";

pub const HEADER_FORMAT: &str = "### %Y/%m/%d %H:%M:%S";

pub fn file_name(repo_name: &str) -> String {
    format!("changelog-{}.md", repo_name)
}

/// Where the changelog for `repo` lives.
///
/// The first matching override wins, then `Resources/Notes` if it exists,
/// then the repository root.
pub fn resolve_path(repo: &RepositoryTarget, overrides: &[ChangelogOverride]) -> Result<PathBuf> {
    if repo.name.is_empty() {
        return Err(Error::ChangelogResolution(format!(
            "repository at {} has no name",
            repo.root().display()
        )));
    }

    let file = file_name(&repo.name);

    if let Some(subpath) = overrides.iter().find_map(|o| o.subpath_for(&repo.name)) {
        let subpath = subpath.trim_matches('/');
        let dir = if subpath.is_empty() {
            repo.root().to_path_buf()
        } else {
            repo.root().join(subpath)
        };
        return Ok(dir.join(file));
    }

    let notes_dir = repo.root().join(NOTES_DIR);
    if notes_dir.is_dir() {
        return Ok(notes_dir.join(file));
    }

    Ok(repo.root().join(file))
}

/// Markdown status block: dated header and one bullet per entry.
pub fn format_status_block(timestamp: NaiveDateTime, entries: &[ChangeEntry]) -> String {
    let mut block = timestamp.format(HEADER_FORMAT).to_string();
    for entry in entries {
        block.push_str("\n- ");
        block.push_str(&entry.to_string());
    }
    block
}

pub fn format_entry(status_block: &str, commit_hash: &str) -> String {
    format!("{}\n\nCommit hash: {}\n\n", status_block, commit_hash)
}

/// Write `text` above whatever `path` already holds, creating the file first
/// if needed.
pub fn prepend(path: &Path, text: &str) -> Result<()> {
    if !path.exists() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        OpenOptions::new().write(true).create_new(true).open(path)?;
        info!("Changelog file {} created.", path.display());
    }

    debug!(
        "Writing changes: {} to '{}'",
        text.replace('\n', " "),
        path.display()
    );

    let mut file = OpenOptions::new().read(true).write(true).open(path)?;
    let mut existing = Vec::new();
    file.read_to_end(&mut existing)?;

    file.seek(SeekFrom::Start(0))?;
    file.write_all(text.as_bytes())?;
    file.write_all(&existing)?;
    file.flush()?;

    Ok(())
}
