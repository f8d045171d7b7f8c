use tracing::info;

/// A fully rendered outbound email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    /// Rendered body. May carry one-time secrets; never log it.
    pub body: String,
}

/// Outbound email capability.
///
/// Delivery is fire-and-forget from the caller's point of view: callers log
/// failures and carry on. The future is `Send` so delivery can run on a
/// spawned task.
pub trait EmailSender: Send + Sync {
    fn send(&self, message: &EmailMessage) -> impl Future<Output = anyhow::Result<()>> + Send;
}

/// Sender that only records the delivery attempt in the log.
///
/// Used when no email API is configured (local development). Logs the
/// recipient and subject only.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogEmailSender;

impl EmailSender for LogEmailSender {
    async fn send(&self, message: &EmailMessage) -> anyhow::Result<()> {
        info!(
            to = %message.to,
            subject = %message.subject,
            "email delivery skipped (no email api configured)"
        );
        Ok(())
    }
}
