//! `remindd-mailer` — the outbound mail capability.
//!
//! [`Mailer`] is the seam between the delivery loop and the outside
//! world: one call, one message, a receipt or a typed failure. The
//! production implementation is [`SmtpMailer`] (lettre over a STARTTLS
//! relay); tests substitute stubs.

pub mod mailer;
pub mod smtp;

pub use mailer::{MailReceipt, Mailer, MailerError, OutgoingMail};
pub use smtp::SmtpMailer;
