//! dispatch-worker — runs one alert-dispatch pass over the configured
//! rules. Scheduling is the caller's job (cron, systemd timer, CI).

use std::sync::Arc;

use clap::Parser;
use tracing::info;

use courier_core::DispatchConfig;
use courier_dispatch::{validate_all, FailurePolicy, Orchestrator};
use courier_notify::SmtpMailerFactory;
use courier_queue::FileAlertStore;

/// Alert dispatch worker — validates rules, fetches pending alerts and
/// delivers them by email.
#[derive(Parser, Debug)]
#[command(name = "dispatch-worker", version, about)]
struct Cli {
    /// Path to the dispatch rules YAML file.
    #[arg(long, env = "DISPATCH_CONFIG", default_value = "config/dispatch.yml")]
    config: String,

    /// Path of the JSON-lines alert queue file.
    #[arg(long, env = "DISPATCH_QUEUE", default_value = "var/alerts.jsonl")]
    queue: String,

    /// Validate the configured rules and exit without dispatching.
    #[arg(long)]
    check: bool,

    /// Keep processing remaining rules when one fails.
    #[arg(long)]
    skip_failed: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = DispatchConfig::from_file(&cli.config)?;
    info!(
        path = %cli.config,
        rules = config.configurations.len(),
        "loaded dispatch configuration"
    );

    if cli.check {
        let rules = validate_all(&config.configurations)?;
        info!(rules = rules.len(), "configuration valid");
        return Ok(());
    }

    let policy = if cli.skip_failed {
        FailurePolicy::SkipAndReport
    } else {
        FailurePolicy::AbortRun
    };

    let store: Arc<FileAlertStore> = Arc::new(FileAlertStore::new(&cli.queue));
    let orchestrator =
        Orchestrator::new(store, Arc::new(SmtpMailerFactory)).with_policy(policy);

    let report = orchestrator.run(&config.configurations).await?;

    let failed = report.failed_count();
    if failed > 0 {
        anyhow::bail!("{failed} rule(s) failed");
    }
    Ok(())
}
