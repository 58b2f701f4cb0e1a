//! SMTP mailer via `lettre` with TLS support.
//!
//! One [`SmtpMailer`] is built per rule from its `smtp` settings, verified
//! with a connection test, used for a single send, and dropped.

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Attachment, Mailbox, MessageBuilder, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::traits::{AttachmentFile, Envelope, Mailer, MailerFactory, NotifyError};

/// Transport encryption for the SMTP connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encryption {
    /// Plain connection, no TLS.
    #[default]
    None,
    /// STARTTLS upgrade after connecting.
    StartTls,
    /// Implicit TLS from the first byte.
    Ssl,
}

impl Encryption {
    /// Parse the configuration string. Unknown values are rejected at the
    /// validation boundary, so this returns `None` rather than erroring.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "ssl" => Some(Encryption::Ssl),
            "starttls" => Some(Encryption::StartTls),
            _ => None,
        }
    }
}

/// Connection settings for one rule's SMTP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub encryption: Encryption,
}

/// Sends notifications as email via SMTP.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    host: String,
}

impl SmtpMailer {
    /// Build a transport for `settings` and verify the connection.
    ///
    /// A server that cannot be reached or rejects the credentials fails
    /// here with [`NotifyError::Connection`], before any message is built.
    pub async fn connect(settings: &SmtpSettings) -> Result<Self, NotifyError> {
        let builder = match settings.encryption {
            Encryption::Ssl => AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
                .map_err(|e| NotifyError::Connection(e.to_string()))?,
            Encryption::StartTls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
                    .map_err(|e| NotifyError::Connection(e.to_string()))?
            }
            Encryption::None => {
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.host)
            }
        };

        let transport = builder
            .port(settings.port)
            .credentials(Credentials::new(
                settings.user.clone(),
                settings.password.clone(),
            ))
            .build();

        match transport.test_connection().await {
            Ok(true) => {}
            Ok(false) => {
                return Err(NotifyError::Connection(format!(
                    "SMTP server {} rejected the connection",
                    settings.host
                )))
            }
            Err(e) => return Err(NotifyError::Connection(e.to_string())),
        }

        Ok(Self {
            transport,
            host: settings.host.clone(),
        })
    }

    fn base_builder(envelope: &Envelope) -> Result<MessageBuilder, NotifyError> {
        let from: Mailbox = envelope
            .from
            .parse()
            .map_err(|e: lettre::address::AddressError| NotifyError::Config(e.to_string()))?;

        let mut builder = Message::builder()
            .from(from)
            .subject(envelope.subject.clone());

        for recipient in &envelope.to {
            let to: Mailbox = recipient
                .parse()
                .map_err(|e: lettre::address::AddressError| NotifyError::Config(e.to_string()))?;
            builder = builder.to(to);
        }

        Ok(builder)
    }

    /// Wrap the main body part with any file attachments.
    fn with_attachments(
        body: SinglePart,
        attachments: &[AttachmentFile],
    ) -> Result<MultiPart, NotifyError> {
        let mut mixed = MultiPart::mixed().singlepart(body);
        for attachment in attachments {
            let content = std::fs::read(&attachment.path)?;
            mixed = mixed.singlepart(
                Attachment::new(attachment.name.clone()).body(content, ContentType::TEXT_PLAIN),
            );
        }
        Ok(mixed)
    }

    fn with_attachments_multipart(
        body: MultiPart,
        attachments: &[AttachmentFile],
    ) -> Result<MultiPart, NotifyError> {
        let mut mixed = MultiPart::mixed().multipart(body);
        for attachment in attachments {
            let content = std::fs::read(&attachment.path)?;
            mixed = mixed.singlepart(
                Attachment::new(attachment.name.clone()).body(content, ContentType::TEXT_PLAIN),
            );
        }
        Ok(mixed)
    }

    async fn deliver(&self, envelope: &Envelope, message: Message) -> Result<(), NotifyError> {
        self.transport
            .send(message)
            .await
            .map_err(|e| NotifyError::Smtp(e.to_string()))?;

        tracing::info!(
            host = %self.host,
            subject = %envelope.subject,
            recipients = envelope.to.len(),
            "notification delivered"
        );
        Ok(())
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_text(
        &self,
        envelope: &Envelope,
        body: &str,
        attachments: &[AttachmentFile],
    ) -> Result<(), NotifyError> {
        let message = Self::base_builder(envelope)?
            .multipart(Self::with_attachments(
                SinglePart::plain(body.to_string()),
                attachments,
            )?)
            .map_err(|e| NotifyError::Smtp(e.to_string()))?;

        self.deliver(envelope, message).await
    }

    async fn send_html(
        &self,
        envelope: &Envelope,
        html: &str,
        attachments: &[AttachmentFile],
    ) -> Result<(), NotifyError> {
        let message = Self::base_builder(envelope)?
            .multipart(Self::with_attachments(
                SinglePart::html(html.to_string()),
                attachments,
            )?)
            .map_err(|e| NotifyError::Smtp(e.to_string()))?;

        self.deliver(envelope, message).await
    }

    async fn send_multipart(
        &self,
        envelope: &Envelope,
        text: &str,
        html: &str,
        attachments: &[AttachmentFile],
    ) -> Result<(), NotifyError> {
        let alternative = MultiPart::alternative_plain_html(text.to_string(), html.to_string());
        let message = Self::base_builder(envelope)?
            .multipart(Self::with_attachments_multipart(alternative, attachments)?)
            .map_err(|e| NotifyError::Smtp(e.to_string()))?;

        self.deliver(envelope, message).await
    }
}

/// Production [`MailerFactory`] building one [`SmtpMailer`] per rule.
#[derive(Debug, Default)]
pub struct SmtpMailerFactory;

#[async_trait]
impl MailerFactory for SmtpMailerFactory {
    async fn connect(&self, settings: &SmtpSettings) -> Result<Box<dyn Mailer>, NotifyError> {
        Ok(Box::new(SmtpMailer::connect(settings).await?))
    }
}
