use std::time::Duration;

use anyhow::Context as _;
use serde::Serialize;

use campus_core::email::{EmailMessage, EmailSender, LogEmailSender};

#[derive(Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

/// Sender backed by a transactional email HTTP API.
#[derive(Clone)]
pub struct HttpEmailSender {
    pub client: reqwest::Client,
    pub api_url: String,
    pub from: String,
}

impl EmailSender for HttpEmailSender {
    async fn send(&self, message: &EmailMessage) -> anyhow::Result<()> {
        self.client
            .post(&self.api_url)
            .json(&SendEmailRequest {
                from: &self.from,
                to: &message.to,
                subject: &message.subject,
                text: &message.body,
            })
            .send()
            .await
            .context("send email request")?
            .error_for_status()
            .context("email api returned error status")?;
        Ok(())
    }
}

/// The email sender chosen at startup.
#[derive(Clone)]
pub enum AppEmailSender {
    Log(LogEmailSender),
    Http(HttpEmailSender),
}

impl AppEmailSender {
    /// HTTP delivery when an API URL is configured, log-only otherwise.
    /// Every API request is cut off after `timeout`.
    pub fn from_config(
        api_url: Option<String>,
        from: String,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let Some(api_url) = api_url else {
            return Ok(Self::Log(LogEmailSender));
        };
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("build email api client")?;
        Ok(Self::Http(HttpEmailSender {
            client,
            api_url,
            from,
        }))
    }
}

impl EmailSender for AppEmailSender {
    async fn send(&self, message: &EmailMessage) -> anyhow::Result<()> {
        match self {
            Self::Log(sender) => sender.send(message).await,
            Self::Http(sender) => sender.send(message).await,
        }
    }
}
