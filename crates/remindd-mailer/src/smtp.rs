use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::{info, warn};
use uuid::Uuid;

use remindd_core::config::SmtpConfig;

use crate::mailer::{MailReceipt, Mailer, MailerError, OutgoingMail};

/// SMTP-backed [`Mailer`] over a pooled STARTTLS relay connection.
///
/// Built once at startup and shared across every delivery cycle; lettre
/// keeps a connection pool internally, so a transient relay outage
/// surfaces as per-send `Transport` errors and heals on its own.
#[derive(Debug)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Build the transport from `[smtp]` config. Fails only on an
    /// unparseable `from` mailbox or relay host name.
    pub fn new(config: &SmtpConfig) -> Result<Self, MailerError> {
        let from: Mailbox = config
            .from
            .parse()
            .map_err(|_| MailerError::Address(config.from.clone()))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| MailerError::Transport(e.to_string()))?
            .port(config.port);

        if let (Some(user), Some(pass)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }

    /// Probe the relay once at startup, logging the outcome.
    ///
    /// A dead relay is not fatal: sends fail per cycle and recover when
    /// the relay comes back.
    pub async fn verify(&self) {
        match self.transport.test_connection().await {
            Ok(true) => info!("SMTP transport verified"),
            Ok(false) => warn!("SMTP transport refused the connection test"),
            Err(e) => warn!(error = %e, "SMTP transport verification failed"),
        }
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<MailReceipt, MailerError> {
        let to: Mailbox = mail
            .to
            .parse()
            .map_err(|_| MailerError::Address(mail.to.clone()))?;

        let message_id = format!("<{}@{}>", Uuid::new_v4(), self.from.email.domain());

        let builder = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(mail.subject.clone())
            .message_id(Some(message_id.clone()));

        let message = match &mail.html_body {
            Some(html) => builder
                .multipart(MultiPart::alternative_plain_html(
                    mail.text_body.clone(),
                    html.clone(),
                ))
                .map_err(|e| MailerError::Message(e.to_string()))?,
            None => builder
                .header(ContentType::TEXT_PLAIN)
                .body(mail.text_body.clone())
                .map_err(|e| MailerError::Message(e.to_string()))?,
        };

        self.transport
            .send(message)
            .await
            .map_err(|e| MailerError::Transport(e.to_string()))?;

        Ok(MailReceipt { message_id })
    }
}
