use std::fmt;
use std::path::{Path, PathBuf};

/// Working-tree status of a single path, as reported by `git status --porcelain`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusCode {
    Untracked,
    Modified,
    Deleted,
    Added,
    Renamed,
    Copied,
    /// Any other porcelain code (`MM`, `AM`, `UU`, ...), kept verbatim.
    Other(String),
}

impl StatusCode {
    pub fn as_str(&self) -> &str {
        match self {
            StatusCode::Untracked => "U",
            StatusCode::Modified => "M",
            StatusCode::Deleted => "D",
            StatusCode::Added => "A",
            StatusCode::Renamed => "R",
            StatusCode::Copied => "C",
            StatusCode::Other(code) => code,
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "??" => StatusCode::Untracked,
            "M" => StatusCode::Modified,
            "D" => StatusCode::Deleted,
            "A" => StatusCode::Added,
            "R" => StatusCode::Renamed,
            "C" => StatusCode::Copied,
            other => StatusCode::Other(other.to_string()),
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEntry {
    pub status: StatusCode,
    pub path: String,
}

impl ChangeEntry {
    pub fn new(status: StatusCode, path: impl Into<String>) -> Self {
        Self {
            status,
            path: path.into(),
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.status == StatusCode::Deleted
    }
}

impl fmt::Display for ChangeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status, self.path)
    }
}

/// A git repository directly under the vault path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryTarget {
    pub name: String,
    pub root_path: PathBuf,
}

impl RepositoryTarget {
    pub fn new(name: impl Into<String>, root_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            root_path: root_path.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root_path
    }
}

/// What happened to one repository during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoOutcome {
    /// No uncommitted changes, untracked files included.
    Clean,
    /// Dirty, but every change was filtered out (e.g. only the changelog moved).
    NothingActionable,
    Published {
        commit_hash: String,
        changelog: PathBuf,
        entries: Vec<ChangeEntry>,
    },
}

/// Per-repository results of one run, in scan order.
#[derive(Debug, Default)]
pub struct RunReport {
    outcomes: Vec<(RepositoryTarget, RepoOutcome)>,
    failures: Vec<(RepositoryTarget, String)>,
}

impl RunReport {
    pub fn record(&mut self, repo: RepositoryTarget, outcome: RepoOutcome) {
        self.outcomes.push((repo, outcome));
    }

    pub fn record_failure(&mut self, repo: RepositoryTarget, reason: impl Into<String>) {
        self.failures.push((repo, reason.into()));
    }

    /// Repositories that were processed without error.
    pub fn outcomes(&self) -> &[(RepositoryTarget, RepoOutcome)] {
        &self.outcomes
    }

    /// Repositories whose workflow stopped part way, with the reason.
    pub fn failures(&self) -> &[(RepositoryTarget, String)] {
        &self.failures
    }

    pub fn published(&self) -> impl Iterator<Item = (&RepositoryTarget, &RepoOutcome)> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| matches!(outcome, RepoOutcome::Published { .. }))
            .map(|(repo, outcome)| (repo, outcome))
    }

    pub fn repositories_seen(&self) -> usize {
        self.outcomes.len() + self.failures.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_parse() {
        assert_eq!(StatusCode::parse("??"), StatusCode::Untracked);
        assert_eq!(StatusCode::parse("M"), StatusCode::Modified);
        assert_eq!(StatusCode::parse("D"), StatusCode::Deleted);
        assert_eq!(StatusCode::parse("MM"), StatusCode::Other("MM".to_string()));
    }

    #[test]
    fn test_untracked_renders_as_single_letter() {
        assert_eq!(StatusCode::Untracked.as_str(), "U");
        assert_eq!(StatusCode::parse("AM").as_str(), "AM");
    }

    #[test]
    fn test_change_entry_display() {
        let entry = ChangeEntry::new(StatusCode::Deleted, "Daily/2024-01-01.md");
        assert_eq!(entry.to_string(), "D Daily/2024-01-01.md");
        assert!(entry.is_deleted());
    }

    #[test]
    fn test_run_report_counts() {
        let mut report = RunReport::default();
        report.record(RepositoryTarget::new("a", "/v/a"), RepoOutcome::Clean);
        report.record(
            RepositoryTarget::new("b", "/v/b"),
            RepoOutcome::Published {
                commit_hash: "abc".to_string(),
                changelog: PathBuf::from("/v/b/changelog-b.md"),
                entries: vec![],
            },
        );
        report.record_failure(RepositoryTarget::new("c", "/v/c"), "boom");

        assert_eq!(report.repositories_seen(), 3);
        assert_eq!(report.published().count(), 1);
        assert_eq!(report.outcomes().len(), 2);
        assert!(report.has_failures());
        assert_eq!(report.failures()[0].0.name, "c");
        assert_eq!(report.failures()[0].1, "boom");
    }
}
