//! Daemon mode
//!
//! Runs the main event loop: one initial reconciliation pass, then one pass
//! per topology trigger until interrupted. Passes run to completion on this
//! single context before the next trigger is taken, so two passes can never
//! fight over the same default-device slot. A slow external call delays but
//! does not corrupt later passes.

use color_eyre::eyre::Result;
use tokio::signal;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::host::AudioHost;
use crate::mixer::{AppLauncher, AutomationChannel};
use crate::monitor;
use crate::notification::send_notification;
use crate::prefs::PreferenceStore;
use crate::reconcile::{PassOutcome, Reconciler};

/// Run the daemon with the given configuration. Blocks until interrupted.
///
/// # Errors
/// Returns an error only if topology listener registration fails at startup;
/// after that, every failure is soft.
pub async fn run<H, P, L, A>(config: &Config, reconciler: &Reconciler<H, P, L, A>) -> Result<()>
where
    H: AudioHost,
    P: PreferenceStore,
    L: AppLauncher,
    A: AutomationChannel,
{
    // Filter format: "dacbridge=LEVEL" ensures only our crate logs at the
    // configured level. RUST_LOG still overrides.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("dacbridge={}", config.settings.log_level))
    });

    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting dacbridge daemon");

    // Converge once before any event arrives.
    let outcome = reconciler.run_pass();
    notify_if_switched(config, &outcome);

    let mut triggers = monitor::subscribe()?;

    if config.settings.notify_daemon
        && let Err(e) = send_notification("dacbridge started", "Output arbitration running")
    {
        warn!("Could not send startup notification: {e:#}");
    }

    info!("Watching audio topology...");

    loop {
        tokio::select! {
            trigger = triggers.recv() => {
                match trigger {
                    Some(t) => {
                        debug!("topology event: {}", t.describe());
                        let outcome = reconciler.run_pass();
                        notify_if_switched(config, &outcome);
                    }
                    None => {
                        error!("topology listener channel closed");
                        break;
                    }
                }
            }

            _ = signal::ctrl_c() => {
                info!("Shutting down");
                if config.settings.notify_daemon {
                    let _ = send_notification("dacbridge stopped", "Output arbitration stopped");
                }
                break;
            }
        }
    }

    Ok(())
}

fn notify_if_switched(config: &Config, outcome: &PassOutcome) {
    if !config.settings.notify_switch || !outcome.changed {
        return;
    }
    let target = outcome.target.as_deref().unwrap_or("(unresolved)");
    let body = format!("{} mode → {target}", outcome.mode);
    if let Err(e) = send_notification("Audio Output", &body) {
        warn!("Notification failed: {e:#}");
    }
}
