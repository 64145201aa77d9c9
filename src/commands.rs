//! CLI commands
//!
//! Implements the one-shot paths: preference toggling, diagnostics, and the
//! `--set-default` overrides. All of them return normally regardless of
//! internal host-call failures; the worst case for the user is incomplete
//! `--diagnose` output.

use color_eyre::eyre::Result;
use crossterm::style::Stylize;

use crate::cli::BypassArg;
use crate::host::{AudioHost, DeviceSnapshot};
use crate::mixer::{AppLauncher, AutomationChannel};
use crate::prefs::PreferenceStore;
use crate::reconcile::Reconciler;
use crate::style::BridgeStyle;

/// Apply a `--bypass` argument to the store, returning the new value
///
/// # Errors
/// Returns an error if the preference cannot be persisted.
pub fn apply_bypass(prefs: &impl PreferenceStore, arg: BypassArg) -> Result<bool> {
    let new_value = match arg {
        BypassArg::On => true,
        BypassArg::Off => false,
        BypassArg::Toggle => !prefs.bypass(),
    };
    prefs.set_bypass(new_value)?;

    let mode = if new_value {
        "direct (bypass on)".to_string().warning()
    } else {
        "mixed (bypass off)".to_string().success()
    };
    println!("Routing preference: {mode}");

    Ok(new_value)
}

/// Dispatch a `--set-default` target
pub fn set_default<H, P, L, A>(reconciler: &Reconciler<H, P, L, A>, target: &str)
where
    H: AudioHost,
    P: PreferenceStore,
    L: AppLauncher,
    A: AutomationChannel,
{
    match target.to_lowercase().as_str() {
        "bgm" => reconciler.force_mixed(),
        "su1" => reconciler.force_direct(),
        needle => reconciler.set_named_default(needle),
    }
}

/// Print every output device with its volume-capability flag and whether it
/// holds either default slot
///
/// # Errors
/// Currently infallible; failed default-slot queries degrade to unmarked
/// output rather than an error.
pub fn diagnose(host: &impl AudioHost) -> Result<()> {
    let snapshot = DeviceSnapshot::capture(host);
    let default_out = host.default_output().ok();
    let default_sys = host.default_system_output().ok();

    println!("{}", "OUTPUT DEVICES:".header());
    println!("{}", "-".repeat(15));

    if snapshot.devices().is_empty() {
        println!("  {}", "(none)".dim());
        return Ok(());
    }

    for device in snapshot.devices() {
        let mut markers = String::new();
        if default_out == Some(device.id) {
            markers.push_str(&format!(" {}", "[DefaultOutput]".success()));
        }
        if default_sys == Some(device.id) {
            markers.push_str(&format!(" {}", "[DefaultSystem]".success()));
        }

        let volume = if host.supports_main_volume(device.id) {
            "yes".to_string().success()
        } else {
            "no".to_string().dim()
        };

        println!("  {}{markers}", device.name.as_str().bold());
        println!("    main volume: {volume}");
    }

    Ok(())
}
