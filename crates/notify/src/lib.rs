//! Notification rendering and delivery for the dispatch pipeline.
//!
//! This crate provides:
//! - `Mailer` trait with three mutually exclusive send modes
//! - `SmtpMailer` implementation via `lettre`
//! - Minijinja rendering of file templates
//! - The scoped `alerts.log` attachment

pub mod attachment;
pub mod render;
pub mod smtp;
pub mod templating;
pub mod traits;

pub use attachment::{AlertLog, ATTACHMENT_NAME};
pub use render::{render_notification, RenderedNotification};
pub use smtp::{Encryption, SmtpMailer, SmtpMailerFactory, SmtpSettings};
pub use templating::TemplateRenderer;
pub use traits::{AttachmentFile, Envelope, Mailer, MailerFactory, NotifyError};
