//! Strict, order-sensitive rule validation.
//!
//! Each raw rule is checked field by field in a fixed order and fails on
//! the first problem, so operators hand-editing configuration always get
//! the same error for the same mistake. No side effect happens before a
//! rule has passed in full.

use std::path::PathBuf;

use courier_core::ConfigError;
use courier_notify::{Encryption, SmtpSettings};
use serde_json::Map;
use serde_yaml::Value;

use crate::rule::{DispatchRule, EmailRule};

/// Validate every raw rule, preserving order.
pub fn validate_all(raw_rules: &[Value]) -> Result<Vec<DispatchRule>, ConfigError> {
    raw_rules.iter().map(validate_rule).collect()
}

/// Validate one raw rule mapping into a typed [`DispatchRule`].
///
/// Check order: `type` first; for `email` then
/// smtp (host, port, user, password, encryption) → subject → fromEmail →
/// toEmail → templates → templateVariables → groups.
pub fn validate_rule(raw: &Value) -> Result<DispatchRule, ConfigError> {
    let alert_type = raw
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| missing("\"type\" for alert dispatch configuration"))?;

    match alert_type {
        "email" => validate_email_rule(raw).map(DispatchRule::Email),
        other => Err(ConfigError::Invalid(format!(
            "invalid alert type \"{other}\""
        ))),
    }
}

fn validate_email_rule(raw: &Value) -> Result<EmailRule, ConfigError> {
    let smtp = validate_smtp(
        raw.get("smtp")
            .filter(|v| v.is_mapping())
            .ok_or_else(|| missing("smtp configuration"))?,
    )?;

    let subject = raw
        .get("subject")
        .and_then(Value::as_str)
        .ok_or_else(|| missing("subject in alert configuration"))?
        .to_string();

    let from_email = raw
        .get("fromEmail")
        .and_then(Value::as_str)
        .ok_or_else(|| missing("from email in alert configuration"))?
        .to_string();

    let to_email = validate_recipients(
        raw.get("toEmail")
            .ok_or_else(|| missing("to email in alert configuration"))?,
    )?;

    let template_html = optional_path(raw, "templateHtml")?;
    let template_text = optional_path(raw, "templateText")?;
    if template_html.is_none() && template_text.is_none() {
        return Err(missing("a html or text email template"));
    }

    let template_variables = match raw.get("templateVariables") {
        None => Map::new(),
        Some(value) if value.is_mapping() => serde_json::to_value(value)
            .ok()
            .and_then(|v| v.as_object().cloned())
            .ok_or_else(|| {
                ConfigError::Invalid("invalid template variables in alert configuration".to_string())
            })?,
        Some(_) => {
            return Err(ConfigError::Invalid(
                "invalid template variables in alert configuration".to_string(),
            ))
        }
    };

    let groups = validate_groups(raw.get("groups"))?;

    Ok(EmailRule {
        smtp,
        subject,
        from_email,
        to_email,
        template_html,
        template_text,
        template_variables,
        groups,
    })
}

fn validate_smtp(smtp: &Value) -> Result<SmtpSettings, ConfigError> {
    let host = smtp
        .get("host")
        .and_then(Value::as_str)
        .ok_or_else(|| missing("host in alert mail smtp configuration"))?
        .to_string();

    let port_raw = smtp
        .get("port")
        .and_then(Value::as_u64)
        .ok_or_else(|| missing("port in alert mail smtp configuration"))?;
    let port = u16::try_from(port_raw).map_err(|_| {
        ConfigError::Invalid(format!(
            "invalid port {port_raw} in alert mail smtp configuration"
        ))
    })?;

    let user = smtp
        .get("user")
        .and_then(Value::as_str)
        .ok_or_else(|| missing("user in alert mail smtp configuration"))?
        .to_string();

    let password = smtp
        .get("password")
        .and_then(Value::as_str)
        .ok_or_else(|| missing("password in alert mail smtp configuration"))?
        .to_string();

    let encryption = match smtp.get("encryption") {
        None => Encryption::None,
        Some(value) => {
            let raw = value.as_str().ok_or_else(|| {
                ConfigError::Invalid("invalid encryption type for smtp configuration".to_string())
            })?;
            Encryption::parse(raw).ok_or_else(|| {
                ConfigError::Invalid(format!(
                    "invalid encryption type \"{raw}\" for smtp configuration"
                ))
            })?
        }
    };

    Ok(SmtpSettings {
        host,
        port,
        user,
        password,
        encryption,
    })
}

/// `toEmail` is a single address or a list of addresses.
fn validate_recipients(value: &Value) -> Result<Vec<String>, ConfigError> {
    match value {
        Value::String(address) => Ok(vec![address.clone()]),
        Value::Sequence(entries) => {
            if entries.is_empty() {
                return Err(ConfigError::Invalid(
                    "to email list must not be empty".to_string(),
                ));
            }
            entries
                .iter()
                .map(|entry| {
                    entry
                        .as_str()
                        .map(str::to_string)
                        .ok_or_else(|| {
                            ConfigError::Invalid(
                                "invalid to email entry in alert configuration".to_string(),
                            )
                        })
                })
                .collect()
        }
        _ => Err(missing("to email in alert configuration")),
    }
}

fn validate_groups(value: Option<&Value>) -> Result<Vec<String>, ConfigError> {
    let entries = value
        .and_then(Value::as_sequence)
        .ok_or_else(|| missing("groups to fetch alerts for"))?;

    if entries.is_empty() {
        return Err(ConfigError::Invalid(
            "groups must not be empty".to_string(),
        ));
    }

    entries
        .iter()
        .map(|entry| {
            entry
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| ConfigError::Invalid("invalid group entry".to_string()))
        })
        .collect()
}

fn optional_path(raw: &Value, key: &str) -> Result<Option<PathBuf>, ConfigError> {
    match raw.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_str()
            .map(|path| Some(PathBuf::from(path)))
            .ok_or_else(|| ConfigError::Invalid(format!("invalid {key} in alert configuration"))),
    }
}

fn missing(what: &str) -> ConfigError {
    ConfigError::Missing(what.to_string())
}
