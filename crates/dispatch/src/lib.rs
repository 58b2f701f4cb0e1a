//! Configuration-driven alert dispatch.
//!
//! This crate provides:
//! - Strict validation of raw rule mappings into typed `DispatchRule`s
//! - The `Orchestrator` running one sequential pass over the rules
//! - Compensating requeue so no alert is lost on a failed delivery

pub mod orchestrator;
pub mod rule;
pub mod validate;

pub use orchestrator::{
    format_elapsed, FailurePolicy, Orchestrator, Outcome, RuleOutcome, RunReport,
};
pub use rule::{DispatchRule, EmailRule};
pub use validate::{validate_all, validate_rule};
