use async_trait::async_trait;
use thiserror::Error;

/// One outbound email, ready for a transport.
#[derive(Debug, Clone)]
pub struct OutgoingMail {
    /// Destination mailbox, e.g. `user@example.org` or
    /// `Name <user@example.org>`.
    pub to: String,
    pub subject: String,
    pub text_body: String,
    /// Optional HTML alternative; the transport sends multipart when set.
    pub html_body: Option<String>,
}

/// Proof of a successful send.
#[derive(Debug, Clone)]
pub struct MailReceipt {
    /// RFC 5322 Message-ID assigned to the outgoing message.
    pub message_id: String,
}

/// Errors that can occur while building or delivering a message.
#[derive(Debug, Error)]
pub enum MailerError {
    /// The mailbox string could not be parsed.
    #[error("invalid address: {0}")]
    Address(String),

    /// The message itself could not be assembled.
    #[error("could not build message: {0}")]
    Message(String),

    /// The transport failed to deliver. The record stays unsent and is
    /// retried on the next delivery cycle.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Capability to deliver one message.
///
/// Object-safe so the delivery engine can hold `Arc<dyn Mailer>` and
/// tests can substitute stubs.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: &OutgoingMail) -> Result<MailReceipt, MailerError>;
}
