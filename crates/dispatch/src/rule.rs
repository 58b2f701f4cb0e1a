//! Typed dispatch rules.
//!
//! A rule arrives as an untyped YAML mapping and leaves validation as one
//! of these closed variants. Unknown shapes are rejected at the boundary,
//! never deeper in the pipeline.

use std::path::PathBuf;

use courier_notify::SmtpSettings;
use serde_json::{Map, Value};

/// One declarative alert-dispatch rule, keyed by its `type` field.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchRule {
    Email(EmailRule),
}

impl DispatchRule {
    /// The groups this rule fetches alerts for.
    pub fn groups(&self) -> &[String] {
        match self {
            DispatchRule::Email(rule) => &rule.groups,
        }
    }

    /// The configuration `type` value of this rule.
    pub fn kind(&self) -> &'static str {
        match self {
            DispatchRule::Email(_) => "email",
        }
    }
}

/// Fully validated `type: email` rule.
///
/// Invariants upheld by validation: at least one template is present and
/// `groups` is non-empty.
#[derive(Debug, Clone, PartialEq)]
pub struct EmailRule {
    pub smtp: SmtpSettings,
    pub subject: String,
    pub from_email: String,
    /// One or more recipients; a scalar `toEmail` becomes a singleton.
    pub to_email: Vec<String>,
    pub template_html: Option<PathBuf>,
    pub template_text: Option<PathBuf>,
    /// User-supplied template variables; `alerts` is injected at render
    /// time and overwrites any value configured here.
    pub template_variables: Map<String, Value>,
    pub groups: Vec<String>,
}
