//! Email sender doubles.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use campus_core::email::{EmailMessage, EmailSender};

/// Captures every message instead of delivering it.
#[derive(Debug, Clone, Default)]
pub struct RecordingEmailSender {
    sent: Arc<Mutex<Vec<EmailMessage>>>,
}

impl RecordingEmailSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the messages sent so far.
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<EmailMessage> {
        self.sent.lock().unwrap().last().cloned()
    }

    /// Wait until message number `index` (0-based) has been delivered and
    /// return it. Delivery runs on a background task, so tests await this
    /// instead of reading [`sent`](Self::sent) right after the call.
    pub async fn nth_delivered(&self, index: usize) -> EmailMessage {
        for _ in 0..500 {
            let delivered = self.sent.lock().unwrap().get(index).cloned();
            if let Some(message) = delivered {
                return message;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("email #{index} was never delivered");
    }
}

impl EmailSender for RecordingEmailSender {
    async fn send(&self, message: &EmailMessage) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// Always fails, as an unreachable email API would.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingEmailSender;

impl EmailSender for FailingEmailSender {
    async fn send(&self, _message: &EmailMessage) -> anyhow::Result<()> {
        Err(anyhow::anyhow!("email api unreachable"))
    }
}

/// Waits `delay` before accepting each message, like a congested email API.
#[derive(Debug, Clone, Copy)]
pub struct SlowEmailSender {
    pub delay: Duration,
}

impl EmailSender for SlowEmailSender {
    async fn send(&self, _message: &EmailMessage) -> anyhow::Result<()> {
        tokio::time::sleep(self.delay).await;
        Ok(())
    }
}
