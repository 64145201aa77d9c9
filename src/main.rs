//! dacbridge binary entry point
//!
//! Dispatches to daemon mode or one-shot paths based on CLI flags.

use clap::Parser;
use color_eyre::eyre::Result;

use dacbridge::cli::Args;
use dacbridge::config::Config;
use dacbridge::host::SystemHost;
use dacbridge::mixer::{MixerController, OpenCommandLauncher, OsascriptChannel};
use dacbridge::prefs::FilePreferenceStore;
use dacbridge::reconcile::Reconciler;
use dacbridge::{commands, daemon};

/// Initialize logging for one-shot CLI paths. Daemon mode initializes its own
/// subscriber from the configured log level instead.
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();
}

fn build_reconciler(
    config: &Config,
    host: SystemHost,
    prefs: FilePreferenceStore,
) -> Reconciler<SystemHost, FilePreferenceStore, OpenCommandLauncher, OsascriptChannel> {
    let mixer = MixerController::new(
        config.mixer.clone(),
        OpenCommandLauncher::new(&config.mixer),
        OsascriptChannel::new(config.mixer.device_name.clone()),
    );
    Reconciler::new(host, prefs, mixer, config.routing.clone())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install().expect("Failed to install color_eyre");

    let args = Args::parse();
    let config = Config::load()?;
    let host = SystemHost::default();
    let prefs = FilePreferenceStore::open_default()?;

    // The preference update always applies first; what runs afterwards
    // depends on the remaining flags.
    if args.daemon {
        if let Some(state) = args.bypass {
            commands::apply_bypass(&prefs, state)?;
        }
        let reconciler = build_reconciler(&config, host, prefs);
        return daemon::run(&config, &reconciler).await;
    }

    init_logging();

    if let Some(state) = args.bypass {
        commands::apply_bypass(&prefs, state)?;
    }

    if args.diagnose {
        return commands::diagnose(&host);
    }

    let reconciler = build_reconciler(&config, host, prefs);
    if let Some(target) = args.set_default {
        commands::set_default(&reconciler, &target);
    } else {
        reconciler.run_pass();
    }

    Ok(())
}
