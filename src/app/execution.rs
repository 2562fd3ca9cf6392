//! Scenario execution against a live store

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::io::Write;
use std::time::Duration;
use log::{info, debug, warn};
use tokio::sync::broadcast::{self, error::TryRecvError};

use crate::{cli, config, display};
use crate::notifications::{
    NotificationConfig, NotificationContext, NotificationId, StoreEvent, TimerStats,
};
use super::script::{Script, Step};

/// Outcome of a scenario run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub steps: usize,
    pub snapshots: usize,
    /// Active notifications when the last step finished
    pub remaining: usize,
    pub timers: TimerStats,
}

/// Load the scenario named on the command line, or the built-in one
pub fn load_script(args: &cli::Args) -> Result<Script> {
    match &args.script {
        Some(path) => {
            info!("Loading scenario from: {}", path.display());
            Script::load(path)
        }
        None => {
            info!("No scenario given, replaying the built-in example");
            Ok(Script::builtin())
        }
    }
}

/// Entry point for the binary once logging is up
pub async fn run_scenario(args: &cli::Args, config_manager: &config::ConfigManager) -> Result<RunSummary> {
    let script = load_script(args)?;
    let notification_config = config_manager.get_notification_config()?;
    let renderer = super::initialization::create_renderer(config_manager)?;

    let mut stdout = std::io::stdout();
    run_script(&script, &notification_config, &renderer, &mut stdout).await
}

/// Replay `script` against a fresh store, writing events and snapshots to `out`
pub async fn run_script<W: Write>(
    script: &Script,
    notification_config: &NotificationConfig,
    renderer: &display::NotificationRenderer,
    out: &mut W,
) -> Result<RunSummary> {
    let context = NotificationContext::new();
    context.install(notification_config.build_store()?)?;
    let store = context.store()?;
    let mut events = store.subscribe();

    debug!("Running scenario with {} steps", script.len());

    let mut labels: HashMap<String, NotificationId> = HashMap::new();
    let mut elapsed = Duration::ZERO;
    let mut snapshots = 0;

    for (index, step) in script.steps.iter().enumerate() {
        debug!("Step {}: {}", index + 1, step.name());

        match step {
            Step::Add { kind, title, body, ttl_ms, label } => {
                let id = match ttl_ms {
                    Some(ms) => store.add_with_ttl(*kind, title.as_str(), body.as_str(), Duration::from_millis(*ms)),
                    None => store.add(*kind, title.as_str(), body.as_str()),
                };
                if let Some(label) = label {
                    labels.insert(label.clone(), id);
                }
            }
            Step::Remove { label } => {
                let id = labels.get(label).ok_or_else(|| {
                    anyhow::anyhow!("Step {}: remove refers to unknown label '{}'", index + 1, label)
                })?;
                store.remove(id);
            }
            Step::Clear => store.clear_all(),
            Step::List => {
                write_events(&mut events, renderer, out)?;
                let heading = format!("t+{}ms", elapsed.as_millis());
                writeln!(out, "{}", renderer.render_snapshot(&heading, &store.list())?)
                    .context("Failed to write snapshot")?;
                snapshots += 1;
                continue;
            }
            Step::Wait { ms } => {
                let wait = Duration::from_millis(*ms);
                tokio::time::sleep(wait).await;
                elapsed += wait;
            }
        }

        write_events(&mut events, renderer, out)?;
    }

    let summary = RunSummary {
        steps: script.len(),
        snapshots,
        remaining: store.len(),
        timers: store.timer_stats(),
    };

    context.shutdown();
    out.flush().context("Failed to flush output")?;

    info!(
        "Scenario finished: {} steps, {} still active, {} timers fired",
        summary.steps, summary.remaining, summary.timers.fired
    );

    Ok(summary)
}

/// Print every change event received since the last call
fn write_events<W: Write>(
    events: &mut broadcast::Receiver<StoreEvent>,
    renderer: &display::NotificationRenderer,
    out: &mut W,
) -> Result<()> {
    loop {
        match events.try_recv() {
            Ok(event) => {
                debug!("Store event: {}", event.label());
                writeln!(out, "{}", renderer.render_event(&event)?)
                    .context("Failed to write event")?;
            }
            Err(TryRecvError::Lagged(missed)) => {
                warn!("Event feed lagged, {} events missed", missed);
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return Ok(()),
        }
    }
}
