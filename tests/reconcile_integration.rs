//! End-to-end reconciliation tests through the public API
//!
//! These tests wire a real file-backed preference store to in-memory host and
//! mixer capabilities, then flip the persisted preference between passes the
//! way the CLI would, verifying the routing converges in both directions.

use std::sync::Mutex;

use dacbridge::config::{MixerConfig, RoutingConfig};
use dacbridge::error::{AutomationFailure, HostQueryError};
use dacbridge::host::{AudioHost, DeviceId, OutputDevice};
use dacbridge::mixer::{AppLauncher, AutomationChannel, MixerController};
use dacbridge::prefs::{FilePreferenceStore, PreferenceStore};
use dacbridge::reconcile::{Mode, Reconciler};

// --- In-memory capability implementations ---

struct MemoryHost {
    devices: Vec<OutputDevice>,
    default_output: Mutex<Option<DeviceId>>,
    default_system: Mutex<Option<DeviceId>>,
}

impl MemoryHost {
    fn new(names: &[(u32, &str)]) -> Self {
        Self {
            devices: names
                .iter()
                .map(|(id, name)| OutputDevice {
                    id: DeviceId(*id),
                    name: (*name).to_string(),
                })
                .collect(),
            default_output: Mutex::new(None),
            default_system: Mutex::new(None),
        }
    }
}

impl AudioHost for MemoryHost {
    fn list_output_devices(&self) -> Vec<OutputDevice> {
        self.devices.clone()
    }

    fn default_output(&self) -> Result<DeviceId, HostQueryError> {
        self.default_output
            .lock()
            .unwrap()
            .ok_or(HostQueryError::Status(-1))
    }

    fn default_system_output(&self) -> Result<DeviceId, HostQueryError> {
        self.default_system
            .lock()
            .unwrap()
            .ok_or(HostQueryError::Status(-1))
    }

    fn set_default_output(&self, device: DeviceId) -> Result<(), HostQueryError> {
        *self.default_output.lock().unwrap() = Some(device);
        Ok(())
    }

    fn set_default_system_output(&self, device: DeviceId) -> Result<(), HostQueryError> {
        *self.default_system.lock().unwrap() = Some(device);
        Ok(())
    }

    fn supports_main_volume(&self, _device: DeviceId) -> bool {
        false
    }
}

struct NoopLauncher;

impl AppLauncher for NoopLauncher {
    fn is_running(&self) -> bool {
        true
    }

    fn launch(&self) -> color_eyre::eyre::Result<()> {
        Ok(())
    }
}

struct RecordingAutomation {
    attempts: Mutex<Vec<String>>,
}

impl RecordingAutomation {
    fn new() -> Self {
        Self {
            attempts: Mutex::new(Vec::new()),
        }
    }
}

impl AutomationChannel for RecordingAutomation {
    fn select_output_device(&self, needle: &str) -> Result<(), AutomationFailure> {
        self.attempts.lock().unwrap().push(needle.to_string());
        // Unauthorized automation is the common real-world failure.
        Err(AutomationFailure::ScriptFailed {
            code: 1,
            stderr: "Not authorized to send Apple events".to_string(),
        })
    }
}

// --- Test wiring ---

fn mixer_config() -> MixerConfig {
    MixerConfig {
        device_name: "Background Music".to_string(),
        bundle_id: "com.bearisdriving.BGM.App".to_string(),
        process_name: "Background Music".to_string(),
    }
}

fn routing_config() -> RoutingConfig {
    RoutingConfig {
        dac_candidates: vec!["SMSL".to_string(), "SU-1".to_string(), "USB DAC".to_string()],
        builtin_candidates: vec!["MacBook".to_string(), "Built-in".to_string()],
    }
}

fn build(
    host: MemoryHost,
    prefs: FilePreferenceStore,
) -> Reconciler<MemoryHost, FilePreferenceStore, NoopLauncher, RecordingAutomation> {
    Reconciler::new(
        host,
        prefs,
        MixerController::new(mixer_config(), NoopLauncher, RecordingAutomation::new()),
        routing_config(),
    )
}

fn temp_prefs() -> (tempfile::TempDir, FilePreferenceStore) {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FilePreferenceStore::at_path(dir.path().join("state.toml"));
    (dir, store)
}

#[test]
fn persisted_preference_drives_mode_across_passes() {
    let host = MemoryHost::new(&[
        (1, "MacBook Pro Speakers"),
        (2, "Background Music"),
        (3, "SMSL SU-1"),
    ]);
    let (_dir, prefs) = temp_prefs();
    let r = build(host, prefs);

    // Fresh state file: bypass defaults off, mixed mode claims both slots.
    let outcome = r.run_pass();
    assert_eq!(outcome.mode, Mode::Mixed);
    assert_eq!(outcome.target.as_deref(), Some("Background Music"));
    assert!(outcome.changed);

    // Flip the file the way `--bypass on` would, using a second store handle
    // on the same path to prove the value round-trips through disk.
    FilePreferenceStore::at_path(_dir.path().join("state.toml"))
        .set_bypass(true)
        .expect("persist bypass");

    let outcome = r.run_pass();
    assert_eq!(outcome.mode, Mode::Direct);
    assert_eq!(outcome.target.as_deref(), Some("SMSL SU-1"));
    assert!(outcome.changed, "direct pass should move both slots off BGM");

    // And back again.
    FilePreferenceStore::at_path(_dir.path().join("state.toml"))
        .set_bypass(false)
        .expect("persist bypass");
    let outcome = r.run_pass();
    assert_eq!(outcome.mode, Mode::Mixed);
    assert!(outcome.changed);
}

#[test]
fn repeated_passes_converge_and_stay_quiet() {
    let host = MemoryHost::new(&[(2, "Background Music"), (3, "SMSL SU-1")]);
    let (_dir, prefs) = temp_prefs();
    let r = build(host, prefs);

    assert!(r.run_pass().changed);
    assert!(!r.run_pass().changed);
    assert!(!r.run_pass().changed);
}

#[test]
fn direct_mode_falls_back_when_dac_unplugged() {
    let host = MemoryHost::new(&[(1, "MacBook Pro Speakers"), (2, "Background Music")]);
    let (_dir, prefs) = temp_prefs();
    prefs.set_bypass(true).expect("persist bypass");
    let r = build(host, prefs);

    let outcome = r.run_pass();
    assert_eq!(outcome.mode, Mode::Direct);
    assert_eq!(outcome.target.as_deref(), Some("MacBook Pro Speakers"));
}

#[test]
fn mixed_mode_survives_unauthorized_automation() {
    let host = MemoryHost::new(&[(2, "Background Music")]);
    let (_dir, prefs) = temp_prefs();
    let r = build(host, prefs);

    // Every automation call fails; the pass still completes and the boundary
    // device assignment sticks.
    let outcome = r.run_pass();
    assert_eq!(outcome.mode, Mode::Mixed);
    assert!(outcome.changed);
}
