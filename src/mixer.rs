//! Mixer application control
//!
//! Keeps the software mixer alive and positioned as the audio boundary
//! device, and steers its internal output selection toward the physical DAC
//! through an external automation channel. Everything here is best-effort:
//! a mixer that fails to launch is detected indirectly on the next pass via
//! the device list, and automation failures leave the mixer's internal
//! routing unchanged until permission is granted or the app is reachable.

use std::process::Command;

use color_eyre::eyre::{Result, bail};
use tracing::{debug, info, warn};

use crate::config::MixerConfig;
use crate::error::AutomationFailure;
use crate::host::{AudioHost, DeviceSnapshot, Slot, ensure_default_slot};

/// Process-launch capability for the mixer application
pub trait AppLauncher {
    /// Whether a process with the mixer's application identifier is running
    fn is_running(&self) -> bool;

    /// Launch the application hidden and non-activating.
    ///
    /// # Errors
    /// Returns an error if the launch facility fails; callers swallow it.
    fn launch(&self) -> Result<()>;
}

/// Inter-application automation capability
pub trait AutomationChannel {
    /// Instruct the mixer to select, as its internal output, the first of its
    /// devices whose name contains `needle`.
    ///
    /// # Errors
    /// Returns [`AutomationFailure`] if the call cannot be made or the script
    /// reports failure (e.g. missing Automation permission).
    fn select_output_device(&self, needle: &str) -> Result<(), AutomationFailure>;
}

/// Controller for the mixer application, generic over the two capabilities
/// so tests can inject failing fakes.
pub struct MixerController<L, A> {
    config: MixerConfig,
    pub(crate) launcher: L,
    pub(crate) automation: A,
}

impl<L: AppLauncher, A: AutomationChannel> MixerController<L, A> {
    pub fn new(config: MixerConfig, launcher: L, automation: A) -> Self {
        Self {
            config,
            launcher,
            automation,
        }
    }

    #[must_use]
    pub fn device_name(&self) -> &str {
        &self.config.device_name
    }

    /// Launch the mixer if it is not already running. Launch failure is
    /// swallowed: its absence shows up in the next pass's device list.
    pub fn ensure_running(&self) {
        if self.launcher.is_running() {
            return;
        }
        info!("Launching mixer '{}'", self.config.bundle_id);
        if let Err(e) = self.launcher.launch() {
            warn!("could not launch mixer: {e:#}");
        }
    }

    /// Resolve the mixer's boundary device by name and point both default
    /// slots at it. Each slot is attempted independently; partial success
    /// self-corrects on the next pass. Returns whether either slot changed.
    pub fn ensure_boundary_device(&self, host: &impl AudioHost, snapshot: &DeviceSnapshot) -> bool {
        let Some(mixer_device) = snapshot.find_by_substring(&self.config.device_name) else {
            debug!(
                "mixer device '{}' not present in device list",
                self.config.device_name
            );
            return false;
        };

        let out_changed = ensure_default_slot(host, Slot::Output, mixer_device);
        let sys_changed = ensure_default_slot(host, Slot::SystemOutput, mixer_device);
        out_changed || sys_changed
    }

    /// Try each candidate in priority order until one automation call reports
    /// success. Failures are non-fatal.
    pub fn select_physical_output(&self, candidates: &[String]) {
        for candidate in candidates {
            match self.automation.select_output_device(candidate) {
                Ok(()) => {
                    debug!("mixer internal output steered via '{candidate}'");
                    return;
                }
                Err(e) => debug!("automation candidate '{candidate}' failed: {e}"),
            }
        }
        debug!("no automation candidate succeeded; mixer routing left unchanged");
    }
}

// ============================================================================
// Real capability implementations (process tools)
// ============================================================================

/// Launcher backed by `pgrep` and `open`
#[derive(Debug, Clone)]
pub struct OpenCommandLauncher {
    process_name: String,
    bundle_id: String,
}

impl OpenCommandLauncher {
    #[must_use]
    pub fn new(config: &MixerConfig) -> Self {
        Self {
            process_name: config.process_name.clone(),
            bundle_id: config.bundle_id.clone(),
        }
    }
}

impl AppLauncher for OpenCommandLauncher {
    fn is_running(&self) -> bool {
        Command::new("pgrep")
            .args(["-x", &self.process_name])
            .output()
            .is_ok_and(|out| out.status.success())
    }

    fn launch(&self) -> Result<()> {
        // -g: do not bring to foreground, -j: launch hidden
        let status = Command::new("open")
            .args(["-g", "-j", "-b", &self.bundle_id])
            .status()?;
        if !status.success() {
            bail!("open exited with {status} for bundle '{}'", self.bundle_id);
        }
        Ok(())
    }
}

/// Automation channel backed by `osascript`
#[derive(Debug, Clone)]
pub struct OsascriptChannel {
    app_name: String,
}

impl OsascriptChannel {
    #[must_use]
    pub fn new(app_name: String) -> Self {
        Self { app_name }
    }

    fn script_for(&self, needle: &str) -> String {
        // Values come from config, but keep the script well-formed regardless.
        let app = escape_applescript(&self.app_name);
        let needle = escape_applescript(needle);
        format!(
            "tell application \"{app}\"\n  \
               set targetDevice to first output device whose name contains \"{needle}\"\n  \
               set selected output device to targetDevice\n\
             end tell"
        )
    }
}

fn escape_applescript(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

impl AutomationChannel for OsascriptChannel {
    fn select_output_device(&self, needle: &str) -> Result<(), AutomationFailure> {
        let output = Command::new("/usr/bin/osascript")
            .args(["-e", &self.script_for(needle)])
            .output()?;

        if output.status.success() {
            Ok(())
        } else {
            Err(AutomationFailure::ScriptFailed {
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}
