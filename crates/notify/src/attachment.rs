//! Scoped attachment log for a batch of alerts.
//!
//! One line per alert: `[<timestamp>] <message>`, followed by
//! ` | <data>` when the alert carries a non-empty payload. The file is a
//! named temp file owned by [`AlertLog`]; dropping the value removes it,
//! on every exit path.

use std::io::Write;
use std::path::Path;

use courier_core::AlertRecord;
use tempfile::NamedTempFile;

use crate::traits::{AttachmentFile, NotifyError};

/// Display name the log is attached under.
pub const ATTACHMENT_NAME: &str = "alerts.log";

/// Host platform line separator.
const LINE_SEP: &str = if cfg!(windows) { "\r\n" } else { "\n" };

/// A fully written, flushed alert log living as long as this value.
#[derive(Debug)]
pub struct AlertLog {
    file: NamedTempFile,
}

impl AlertLog {
    /// Write the batch to a fresh temp file and flush it.
    pub fn write(alerts: &[AlertRecord]) -> Result<Self, NotifyError> {
        let mut file = tempfile::Builder::new().suffix(".log").tempfile()?;
        for alert in alerts {
            file.write_all(format_line(alert).as_bytes())?;
            file.write_all(LINE_SEP.as_bytes())?;
        }
        file.flush()?;
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// The log as a transport attachment under [`ATTACHMENT_NAME`].
    pub fn as_attachment(&self) -> AttachmentFile {
        AttachmentFile {
            name: ATTACHMENT_NAME.to_string(),
            path: self.file.path().to_path_buf(),
        }
    }
}

/// Format one alert as a log line (without the trailing separator).
/// Non-empty `data` is appended as compact JSON.
pub fn format_line(alert: &AlertRecord) -> String {
    let mut line = format!("[{}] {}", alert.timestamp.to_rfc3339(), alert.message);
    if !alert.data.is_empty() {
        line.push_str(" | ");
        line.push_str(&serde_json::Value::Object(alert.data.clone()).to_string());
    }
    line
}
