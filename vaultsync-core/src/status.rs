//! Turns `git status --porcelain` output into [`ChangeEntry`] values.

use crate::models::{ChangeEntry, StatusCode};
use tracing::debug;

/// Paths containing this are never reported, so updating the changelog
/// cannot trigger another changelog update.
pub const CHANGELOG_MARKER: &str = "changelog";

/// Split one porcelain line into its status code and path.
///
/// Quotes are dropped, the line is split on the first run of whitespace and
/// everything after it is kept as the path, spaces included.
pub fn parse_status_line(line: &str) -> Option<ChangeEntry> {
    let line = line.replace('"', "");
    let line = line.trim_start();

    let (code, rest) = line.split_once(char::is_whitespace)?;
    let path = rest.trim_start();
    if path.is_empty() {
        return None;
    }

    Some(ChangeEntry::new(StatusCode::parse(code), path))
}

fn wrap_link(entry: &mut ChangeEntry) {
    let wrappable = matches!(entry.status, StatusCode::Untracked | StatusCode::Modified);
    if wrappable && entry.path.ends_with(".md") {
        entry.path = format!("[[{}]]", entry.path);
    }
}

pub fn classify(porcelain: &str, wrap_md_links: bool) -> Vec<ChangeEntry> {
    let entries: Vec<ChangeEntry> = porcelain
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let parsed = parse_status_line(line);
            if parsed.is_none() {
                debug!("Ignoring unparseable status line: {:?}", line);
            }
            parsed
        })
        .map(|mut entry| {
            if wrap_md_links {
                wrap_link(&mut entry);
            }
            entry
        })
        .filter(|entry| !entry.path.contains(CHANGELOG_MARKER))
        .collect();

    debug!("Clean status list: {:?}", entries);

    entries
}
