//! Outbound notification collaborator.
//!
//! # Responsibility
//! - Define the `notify(recipient, subject, message)` seam the core calls.
//! - Provide a log-backed default for deployments without a mail relay.
//!
//! # Invariants
//! - The core never calls a notifier inside a database transaction.
//! - Notification failures are reported to the caller, who logs and moves on.

use log::info;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotifyError {
    #[error("recipient rejected: `{0}`")]
    RejectedRecipient(String),
    #[error("notification transport failed: {0}")]
    Transport(String),
}

/// Fire-and-forget message delivery.
pub trait Notifier {
    fn notify(&self, recipient: &str, subject: &str, message: &str) -> Result<(), NotifyError>;
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn notify(&self, recipient: &str, subject: &str, message: &str) -> Result<(), NotifyError> {
        (**self).notify(recipient, subject, message)
    }
}

impl<N: Notifier + ?Sized> Notifier for Box<N> {
    fn notify(&self, recipient: &str, subject: &str, message: &str) -> Result<(), NotifyError> {
        (**self).notify(recipient, subject, message)
    }
}

/// Writes each notification as a log event instead of sending it.
#[derive(Debug, Clone)]
pub struct LogNotifier {
    sender: String,
}

impl LogNotifier {
    pub fn new(sender: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
        }
    }
}

impl Notifier for LogNotifier {
    fn notify(&self, recipient: &str, subject: &str, message: &str) -> Result<(), NotifyError> {
        if recipient.trim().is_empty() {
            return Err(NotifyError::RejectedRecipient(recipient.to_string()));
        }
        // Metadata only; message bodies stay out of logs.
        info!(
            "event=notify module=notify status=ok sender={} recipient={} subject_chars={} message_chars={}",
            self.sender,
            recipient,
            subject.chars().count(),
            message.chars().count()
        );
        Ok(())
    }
}
