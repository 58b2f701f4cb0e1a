//! Mailer trait definition and shared error types.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::smtp::SmtpSettings;

/// Errors that can occur while rendering or delivering a notification.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("SMTP delivery failed: {0}")]
    Smtp(String),

    #[error("template rendering failed: {0}")]
    Template(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl NotifyError {
    /// Whether the orchestrator may recover by requeueing the fetched
    /// alerts. Connection and protocol failures are recoverable; a broken
    /// template or configuration would fail identically on retry.
    pub fn is_delivery_failure(&self) -> bool {
        matches!(self, NotifyError::Connection(_) | NotifyError::Smtp(_))
    }
}

/// Addressing for one outgoing notification.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
}

/// A file attached to a notification under a display name.
#[derive(Debug, Clone)]
pub struct AttachmentFile {
    /// Name shown to the recipient (e.g. `alerts.log`).
    pub name: String,
    /// Path of the already-written file on disk.
    pub path: PathBuf,
}

/// Scoped delivery transport with three mutually exclusive send modes.
///
/// Which mode runs is decided by template availability: text-only,
/// html-only, or a multipart alternative carrying both. A connection
/// lives for the scope of one rule and is dropped on every exit path.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_text(
        &self,
        envelope: &Envelope,
        body: &str,
        attachments: &[AttachmentFile],
    ) -> Result<(), NotifyError>;

    async fn send_html(
        &self,
        envelope: &Envelope,
        html: &str,
        attachments: &[AttachmentFile],
    ) -> Result<(), NotifyError>;

    async fn send_multipart(
        &self,
        envelope: &Envelope,
        text: &str,
        html: &str,
        attachments: &[AttachmentFile],
    ) -> Result<(), NotifyError>;
}

/// Seam for constructing a connected [`Mailer`] per rule.
///
/// The orchestrator never builds transports itself: production wires in
/// the SMTP factory, tests substitute mocks.
#[async_trait]
pub trait MailerFactory: Send + Sync {
    async fn connect(&self, settings: &SmtpSettings) -> Result<Box<dyn Mailer>, NotifyError>;
}
