//! Configuration error taxonomy.
//!
//! Both variants abort the current dispatch run: a rule that cannot be
//! validated, or whose delivery environment is broken, is an operator
//! problem and must surface instead of being silently skipped.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required field is absent from a rule. A required field carrying
    /// the wrong shape is reported here as well.
    #[error("missing configuration: {0}")]
    Missing(String),

    /// A field is present but semantically wrong (unknown rule type,
    /// unknown encryption), or a delivery failure wrapped with its cause.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
