//! # vaultsync-mail
//!
//! SendGrid v3 transport for vaultsync deletion notices.
//!
//! ## Example
//!
//! ```no_run
//! use vaultsync_core::{DeletionNotifier, Mailbox, Notifier};
//! use vaultsync_mail::SendGridClient;
//!
//! let client = SendGridClient::new("SG.xxxxx");
//! let me = Mailbox { email: "me@example.com".into(), name: "Me".into() };
//! let notifier = DeletionNotifier::new(client, me.clone(), me);
//!
//! notifier.notify_deletions("notes", &[]);
//! ```

use reqwest::StatusCode;
use serde::Serialize;
use tracing::debug;
use vaultsync_core::{EmailNotification, Error, MailTransport, Mailbox, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.sendgrid.com";

#[derive(Clone)]
pub struct SendGridClient {
    base_url: String,
    api_key: String,
    client: reqwest::blocking::Client,
}

#[derive(Serialize)]
struct Address<'a> {
    email: &'a str,
    name: &'a str,
}

impl<'a> From<&'a Mailbox> for Address<'a> {
    fn from(mailbox: &'a Mailbox) -> Self {
        Self {
            email: &mailbox.email,
            name: &mailbox.name,
        }
    }
}

#[derive(Serialize)]
struct Personalization<'a> {
    to: Vec<Address<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    content_type: &'a str,
    value: &'a str,
}

#[derive(Serialize)]
struct SendMailRequest<'a> {
    personalizations: Vec<Personalization<'a>>,
    from: Address<'a>,
    subject: &'a str,
    content: Vec<Content<'a>>,
}

impl<'a> From<&'a EmailNotification> for SendMailRequest<'a> {
    fn from(mail: &'a EmailNotification) -> Self {
        Self {
            personalizations: vec![Personalization {
                to: vec![Address::from(&mail.recipient)],
            }],
            from: Address::from(&mail.sender),
            subject: &mail.subject,
            content: vec![Content {
                content_type: "text/html",
                value: &mail.html_body,
            }],
        }
    }
}

impl SendGridClient {
    /// Create a client for the public SendGrid API.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, api_key)
    }

    /// Create a client against another endpoint, e.g. a local mock.
    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client: reqwest::blocking::Client::new(),
        }
    }

    fn send_url(&self) -> String {
        format!("{}/v3/mail/send", self.base_url)
    }
}

impl MailTransport for SendGridClient {
    /// Only `202 Accepted` counts as delivered.
    fn deliver(&self, mail: &EmailNotification) -> Result<()> {
        let request = SendMailRequest::from(mail);
        debug!("Sending '{}' to {}", mail.subject, mail.recipient.email);

        let response = self
            .client
            .post(self.send_url())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .map_err(|e| Error::Notification(e.to_string()))?;

        match response.status() {
            StatusCode::ACCEPTED => Ok(()),
            status => Err(Error::Notification(format!(
                "SendGrid answered {}: {}",
                status,
                response.text().unwrap_or_default()
            ))),
        }
    }
}
