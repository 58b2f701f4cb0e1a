//! Sequential rule orchestration.
//!
//! One pass over the configured rules: validate → fetch → render → send,
//! with a compensating requeue whenever anything fails after alerts were
//! taken out of the queue. Rules run strictly one after another; a rule
//! completes (including its requeue) before the next begins.

use std::sync::Arc;
use std::time::{Duration, Instant};

use courier_core::ConfigError;
use courier_notify::{
    render_notification, Envelope, MailerFactory, TemplateRenderer,
};
use courier_queue::{AlertStore, QueueError};
use serde_yaml::Value;
use tracing::{error, info, warn};

use crate::rule::DispatchRule;
use crate::validate::validate_rule;

/// What to do when a rule fails validation or delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Abort the whole run on the first failing rule (current contract).
    #[default]
    AbortRun,
    /// Record the failure and keep processing the remaining rules.
    SkipAndReport,
}

/// Terminal state of one rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Dispatched, or nothing pending for the rule's groups.
    Ok,
    /// The rule's alerts were already delivered by a prior attempt.
    Exists,
    /// Failed; only reported under [`FailurePolicy::SkipAndReport`].
    Failed,
}

/// Per-rule result within a run.
#[derive(Debug, Clone)]
pub struct RuleOutcome {
    /// Position of the rule in the configured list.
    pub index: usize,
    pub outcome: Outcome,
    pub error: Option<String>,
}

/// Summary of one orchestration pass.
#[derive(Debug)]
pub struct RunReport {
    pub outcomes: Vec<RuleOutcome>,
    pub elapsed: Duration,
}

impl RunReport {
    pub fn failed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.outcome == Outcome::Failed)
            .count()
    }
}

/// Runs the configured rules against a store and a mailer factory.
///
/// Both collaborators are injected so tests can substitute in-memory
/// fakes; the orchestrator never constructs its own connections.
pub struct Orchestrator {
    store: Arc<dyn AlertStore>,
    mailers: Arc<dyn MailerFactory>,
    renderer: TemplateRenderer,
    policy: FailurePolicy,
}

impl Orchestrator {
    pub fn new(store: Arc<dyn AlertStore>, mailers: Arc<dyn MailerFactory>) -> Self {
        Self {
            store,
            mailers,
            renderer: TemplateRenderer::new(),
            policy: FailurePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Run one pass over `rules`, strictly in order.
    ///
    /// Under [`FailurePolicy::AbortRun`] the first failing rule aborts
    /// the pass and its error propagates; earlier rules keep their
    /// results (a delivered notification is not undone).
    pub async fn run(&self, rules: &[Value]) -> Result<RunReport, ConfigError> {
        let started = Instant::now();
        info!(rules = rules.len(), "running alert dispatch");

        let mut outcomes = Vec::with_capacity(rules.len());
        for (index, raw) in rules.iter().enumerate() {
            match self.process_rule(raw).await {
                Ok(outcome) => {
                    match outcome {
                        Outcome::Ok => info!(rule = index, "OK"),
                        Outcome::Exists => info!(rule = index, "EXISTS"),
                        Outcome::Failed => {}
                    }
                    outcomes.push(RuleOutcome {
                        index,
                        outcome,
                        error: None,
                    });
                }
                Err(e) => match self.policy {
                    FailurePolicy::AbortRun => return Err(e),
                    FailurePolicy::SkipAndReport => {
                        warn!(rule = index, error = %e, "rule failed, continuing");
                        outcomes.push(RuleOutcome {
                            index,
                            outcome: Outcome::Failed,
                            error: Some(e.to_string()),
                        });
                    }
                },
            }
        }

        let elapsed = started.elapsed();
        info!(elapsed = %format_elapsed(elapsed), "completed");
        Ok(RunReport { outcomes, elapsed })
    }

    async fn process_rule(&self, raw: &Value) -> Result<Outcome, ConfigError> {
        let DispatchRule::Email(rule) = validate_rule(raw)?;

        let alerts = match self.store.fetch(&rule.groups).await {
            Ok(alerts) => alerts,
            Err(QueueError::AlreadyDelivered(_)) => return Ok(Outcome::Exists),
            Err(e) => return Err(ConfigError::Invalid(format!("alert fetch failed: {e}"))),
        };

        if alerts.is_empty() {
            return Ok(Outcome::Ok);
        }

        // From here on the alerts are out of the queue; every failure
        // path must put them back before surfacing.
        let rendered = match render_notification(
            &self.renderer,
            &rule.subject,
            rule.template_text.as_deref(),
            rule.template_html.as_deref(),
            &rule.template_variables,
            &alerts,
        ) {
            Ok(rendered) => rendered,
            Err(e) => return Err(self.requeue_and_wrap(alerts, e.to_string()).await),
        };

        let mailer = match self.mailers.connect(&rule.smtp).await {
            Ok(mailer) => mailer,
            Err(e) => return Err(self.requeue_and_wrap(alerts, e.to_string()).await),
        };

        let envelope = Envelope {
            from: rule.from_email.clone(),
            to: rule.to_email.clone(),
            subject: rendered.subject.clone(),
        };
        let attachments = [rendered.attachment.as_attachment()];

        let sent = match (&rendered.text_body, &rendered.html_body) {
            (Some(text), None) => mailer.send_text(&envelope, text, &attachments).await,
            (None, Some(html)) => mailer.send_html(&envelope, html, &attachments).await,
            (Some(text), Some(html)) => {
                mailer.send_multipart(&envelope, text, html, &attachments).await
            }
            // Validation guarantees at least one template.
            (None, None) => Err(courier_notify::NotifyError::Config(
                "rule has no rendered body".to_string(),
            )),
        };

        match sent {
            Ok(()) => Ok(Outcome::Ok),
            Err(e) => Err(self.requeue_and_wrap(alerts, e.to_string()).await),
        }
    }

    /// Compensating action: restore the fetched batch, then wrap the
    /// delivery failure as a configuration-level error carrying its
    /// cause. The queue ends up exactly as before the attempt.
    async fn requeue_and_wrap(
        &self,
        alerts: Vec<courier_core::AlertRecord>,
        cause: String,
    ) -> ConfigError {
        let count = alerts.len();
        if let Err(requeue_err) = self.store.requeue(alerts).await {
            error!(error = %requeue_err, count, "compensating requeue failed, alerts lost");
            return ConfigError::Invalid(format!(
                "delivery failed ({cause}) and requeue failed ({requeue_err})"
            ));
        }
        warn!(count, cause = %cause, "delivery failed, alerts requeued");
        ConfigError::Invalid(cause)
    }
}

/// Format a duration as `H:MM:SS` (whole seconds).
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    format!("{}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_elapsed_is_h_mm_ss() {
        assert_eq!(format_elapsed(Duration::from_secs(0)), "0:00:00");
        assert_eq!(format_elapsed(Duration::from_secs(59)), "0:00:59");
        assert_eq!(format_elapsed(Duration::from_secs(3661)), "1:01:01");
        assert_eq!(format_elapsed(Duration::from_secs(7322)), "2:02:02");
        assert_eq!(format_elapsed(Duration::from_secs(36_000)), "10:00:00");
    }
}
