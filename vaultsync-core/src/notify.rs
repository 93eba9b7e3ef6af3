//! Best-effort email notice when files are deleted from a repository.

use crate::config::Mailbox;
use crate::error::Result;
use crate::models::ChangeEntry;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailNotification {
    pub subject: String,
    pub html_body: String,
    pub sender: Mailbox,
    pub recipient: Mailbox,
}

impl EmailNotification {
    pub fn deletions(
        repo_name: &str,
        deleted: &[ChangeEntry],
        sender: &Mailbox,
        recipient: &Mailbox,
    ) -> Self {
        Self {
            subject: format!("Files being deleted from Obsidian vault '{}'", repo_name),
            html_body: deletion_list_html(deleted),
            sender: sender.clone(),
            recipient: recipient.clone(),
        }
    }
}

/// `<ul><li>D a.md<li>D b.md</ul>`
pub fn deletion_list_html(deleted: &[ChangeEntry]) -> String {
    let items: Vec<String> = deleted.iter().map(ChangeEntry::to_string).collect();
    format!("<ul><li>{}</ul>", items.join("<li>"))
}

/// Delivers a composed email. Implemented by the mail provider client.
pub trait MailTransport {
    fn deliver(&self, mail: &EmailNotification) -> Result<()>;
}

pub trait Notifier {
    /// Returns whether the provider accepted the message. Never fails.
    fn notify_deletions(&self, repo_name: &str, deleted: &[ChangeEntry]) -> bool;
}

pub struct DeletionNotifier<T> {
    transport: T,
    sender: Mailbox,
    recipient: Mailbox,
}

impl<T: MailTransport> DeletionNotifier<T> {
    pub fn new(transport: T, sender: Mailbox, recipient: Mailbox) -> Self {
        Self {
            transport,
            sender,
            recipient,
        }
    }
}

impl<T: MailTransport> Notifier for DeletionNotifier<T> {
    fn notify_deletions(&self, repo_name: &str, deleted: &[ChangeEntry]) -> bool {
        if deleted.is_empty() {
            return false;
        }

        let mail = EmailNotification::deletions(repo_name, deleted, &self.sender, &self.recipient);
        match self.transport.deliver(&mail) {
            Ok(()) => {
                info!(repo = %repo_name, "Sent deletion notice for {} file(s)", deleted.len());
                true
            }
            Err(e) => {
                warn!(repo = %repo_name, "Deletion notice not sent: {}", e);
                false
            }
        }
    }
}
