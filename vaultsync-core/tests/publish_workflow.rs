use chrono::NaiveDate;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use vaultsync_core::{
    ChangeEntry, Config, DeletionNotifier, EmailNotification, Error, FixedClock, GitIdentity,
    GitRunner, Mailbox, MailTransport, Publisher, RepoOutcome, RepositoryTarget, Result,
    StatusCode,
};

const HASH: &str = "9f2c1e0a7b3d4c5e6f708192a3b4c5d6e7f80912";

#[derive(Default)]
struct FakeGit {
    status: HashMap<PathBuf, String>,
    fail_on: Option<&'static str>,
    calls: RefCell<Vec<String>>,
}

impl FakeGit {
    fn with_status(mut self, repo: &Path, porcelain: &str) -> Self {
        self.status.insert(repo.to_path_buf(), porcelain.to_string());
        self
    }

    fn record(&self, call: String) -> Result<()> {
        let failing = self.fail_on.map_or(false, |f| call.starts_with(f));
        self.calls.borrow_mut().push(call.clone());
        if failing {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("fake failure in {}", call),
            )));
        }
        Ok(())
    }

    fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl GitRunner for FakeGit {
    fn status_porcelain(&self, repo: &Path) -> Result<String> {
        self.record(format!("status {}", repo.display()))?;
        Ok(self.status.get(repo).cloned().unwrap_or_default())
    }

    fn set_identity(&self, _repo: &Path, identity: &GitIdentity) -> Result<()> {
        self.record(format!("config {} <{}>", identity.name, identity.email))
    }

    fn commit_procedure(&self, _repo: &Path) -> Result<()> {
        self.record("make commit".to_string())
    }

    fn head_hash(&self, _repo: &Path) -> Result<String> {
        self.record("log".to_string())?;
        Ok(HASH.to_string())
    }

    fn add(&self, _repo: &Path, path: &Path) -> Result<()> {
        self.record(format!("add {}", path.display()))
    }

    fn commit(&self, _repo: &Path, message: &str) -> Result<()> {
        self.record(format!("commit {}", message))
    }

    fn push(&self, _repo: &Path, remote: &str, branch: &str) -> Result<()> {
        self.record(format!("push {} {}", remote, branch))
    }
}

#[derive(Default)]
struct Outbox {
    sent: RefCell<Vec<EmailNotification>>,
}

impl MailTransport for &Outbox {
    fn deliver(&self, mail: &EmailNotification) -> Result<()> {
        self.sent.borrow_mut().push(mail.clone());
        Ok(())
    }
}

struct Fixture {
    vault: TempDir,
    config: Config,
    clock: FixedClock,
}

impl Fixture {
    fn new() -> Self {
        let vault = TempDir::new().unwrap();
        let config = Config {
            vault_path: vault.path().to_path_buf(),
            git_identity: GitIdentity {
                name: "Vault Bot".to_string(),
                email: "bot@example.com".to_string(),
            },
            sendgrid_api_key: "SG.test".to_string(),
            sender: mailbox("vault@example.com"),
            recipient: mailbox("me@example.com"),
            wrap_md_links: false,
            changelog_overrides: Vec::new(),
            debug: false,
        };
        let clock = FixedClock(
            NaiveDate::from_ymd_opt(2024, 5, 17)
                .unwrap()
                .and_hms_opt(21, 30, 0)
                .unwrap(),
        );
        Self {
            vault,
            config,
            clock,
        }
    }

    fn add_repo(&self, name: &str) -> PathBuf {
        let root = self.vault.path().join(name);
        fs::create_dir_all(root.join(".git")).unwrap();
        root
    }

    fn notifier<'o>(&self, outbox: &'o Outbox) -> DeletionNotifier<&'o Outbox> {
        DeletionNotifier::new(
            outbox,
            self.config.sender.clone(),
            self.config.recipient.clone(),
        )
    }
}

fn mailbox(email: &str) -> Mailbox {
    Mailbox {
        email: email.to_string(),
        name: "Vault".to_string(),
    }
}

#[test]
fn modified_files_get_one_changelog_entry_and_no_email() {
    let fx = Fixture::new();
    let root = fx.add_repo("notes");
    fs::write(root.join("changelog-notes.md"), "### older entry\n").unwrap();

    let git = FakeGit::default().with_status(&root, " M Daily/today.md\n M Projects/plan.md\n");
    let outbox = Outbox::default();
    let notifier = fx.notifier(&outbox);

    let report = Publisher::new(&fx.config, &git, &notifier, &fx.clock)
        .run()
        .unwrap();

    assert!(!report.has_failures());
    assert_eq!(report.published().count(), 1);
    assert!(outbox.sent.borrow().is_empty());

    let changelog = fs::read_to_string(root.join("changelog-notes.md")).unwrap();
    assert_eq!(
        changelog,
        format!(
            "### 2024/05/17 21:30:00\n- M Daily/today.md\n- M Projects/plan.md\n\nCommit hash: {}\n\n### older entry\n",
            HASH
        )
    );

    let changelog_path = root.join("changelog-notes.md");
    assert_eq!(
        git.calls(),
        vec![
            format!("status {}", root.display()),
            "config Vault Bot <bot@example.com>".to_string(),
            "make commit".to_string(),
            "log".to_string(),
            format!("add {}", changelog_path.display()),
            "commit Changelog update".to_string(),
            "push origin master".to_string(),
        ]
    );
}

#[test]
fn deleted_file_triggers_one_notification() {
    let fx = Fixture::new();
    let root = fx.add_repo("journal");
    fs::create_dir_all(root.join("Resources/Notes")).unwrap();

    let git = FakeGit::default().with_status(&root, " D Archive/old note.md\n");
    let outbox = Outbox::default();
    let notifier = fx.notifier(&outbox);

    let outcome = Publisher::new(&fx.config, &git, &notifier, &fx.clock)
        .publish_repository(&RepositoryTarget::new("journal", &root))
        .unwrap();

    let sent = outbox.sent.borrow();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].subject.contains("journal"));
    assert_eq!(sent[0].html_body, "<ul><li>D Archive/old note.md</ul>");

    match outcome {
        RepoOutcome::Published {
            changelog, entries, ..
        } => {
            assert_eq!(
                changelog,
                root.join("Resources/Notes/changelog-journal.md")
            );
            assert_eq!(
                entries,
                vec![ChangeEntry::new(StatusCode::Deleted, "Archive/old note.md")]
            );
        }
        other => panic!("expected Published, got {:?}", other),
    }
}

#[test]
fn changelog_only_changes_publish_nothing() {
    let fx = Fixture::new();
    let root = fx.add_repo("notes");

    let git = FakeGit::default().with_status(&root, " M changelog-notes.md\n");
    let outbox = Outbox::default();
    let notifier = fx.notifier(&outbox);

    let report = Publisher::new(&fx.config, &git, &notifier, &fx.clock)
        .run()
        .unwrap();

    assert_eq!(report.outcomes().len(), 1);
    assert_eq!(report.outcomes()[0].1, RepoOutcome::NothingActionable);
    assert_eq!(git.calls(), vec![format!("status {}", root.display())]);
    assert!(!root.join("changelog-notes.md").exists());
}

#[test]
fn clean_repository_is_skipped() {
    let fx = Fixture::new();
    let root = fx.add_repo("notes");

    let git = FakeGit::default();
    let outbox = Outbox::default();
    let notifier = fx.notifier(&outbox);

    let outcome = Publisher::new(&fx.config, &git, &notifier, &fx.clock)
        .publish_repository(&RepositoryTarget::new("notes", &root))
        .unwrap();

    assert_eq!(outcome, RepoOutcome::Clean);
    assert_eq!(git.calls().len(), 1);
}

#[test]
fn empty_vault_does_no_work() {
    let fx = Fixture::new();
    let git = FakeGit::default();
    let outbox = Outbox::default();
    let notifier = fx.notifier(&outbox);

    let report = Publisher::new(&fx.config, &git, &notifier, &fx.clock)
        .run()
        .unwrap();

    assert_eq!(report.repositories_seen(), 0);
    assert!(git.calls().is_empty());
}

#[test]
fn failing_repository_does_not_stop_the_scan() {
    let fx = Fixture::new();
    let first = fx.add_repo("alpha");
    let second = fx.add_repo("beta");

    let git = FakeGit {
        fail_on: Some("make commit"),
        ..Default::default()
    }
    .with_status(&first, "?? a.md\n")
    .with_status(&second, "?? b.md\n");
    let outbox = Outbox::default();
    let notifier = fx.notifier(&outbox);

    let report = Publisher::new(&fx.config, &git, &notifier, &fx.clock)
        .run()
        .unwrap();

    assert_eq!(report.failures().len(), 2);
    assert!(!first.join("changelog-alpha.md").exists());
    assert!(!git.calls().iter().any(|c| c.starts_with("push")));
}

#[test]
fn wiki_links_and_overrides_flow_into_the_changelog() {
    let mut fx = Fixture::new();
    fx.config.wrap_md_links = true;
    fx.config.changelog_overrides =
        vaultsync_core::config::parse_overrides(r#"[{"repo": "work", "subpath": "/Meta"}]"#)
            .unwrap();
    let root = fx.add_repo("work");

    let git = FakeGit::default().with_status(&root, "?? Ideas/new idea.md\n M photo.png\n");
    let outbox = Outbox::default();
    let notifier = fx.notifier(&outbox);

    Publisher::new(&fx.config, &git, &notifier, &fx.clock)
        .run()
        .unwrap();

    let changelog = fs::read_to_string(root.join("Meta/changelog-work.md")).unwrap();
    assert!(changelog.starts_with("### 2024/05/17 21:30:00\n- U [[Ideas/new idea.md]]\n- M photo.png\n"));
}
