//! Injected fakes for exercising the reconciliation logic without a real
//! audio host, process launcher, or automation channel.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;

use color_eyre::eyre::{Result, bail};

use crate::config::{MixerConfig, RoutingConfig};
use crate::error::{AutomationFailure, HostQueryError};
use crate::host::{AudioHost, DeviceId, OutputDevice};
use crate::mixer::{AppLauncher, AutomationChannel};
use crate::prefs::PreferenceStore;

pub(crate) fn device(id: u32, name: &str) -> OutputDevice {
    OutputDevice {
        id: DeviceId(id),
        name: name.to_string(),
    }
}

pub(crate) fn mixer_config() -> MixerConfig {
    MixerConfig {
        device_name: "Background Music".to_string(),
        bundle_id: "com.bearisdriving.BGM.App".to_string(),
        process_name: "Background Music".to_string(),
    }
}

pub(crate) fn routing_config() -> RoutingConfig {
    RoutingConfig {
        dac_candidates: ["SMSL", "SU-1", "USB DAC"].map(String::from).to_vec(),
        builtin_candidates: ["MacBook", "Built-in"].map(String::from).to_vec(),
    }
}

/// A recorded default-slot set attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SetCall {
    Output(DeviceId),
    System(DeviceId),
}

/// In-memory audio host with scripted failure modes
#[derive(Debug, Default)]
pub(crate) struct FakeHost {
    devices: RefCell<Vec<OutputDevice>>,
    current_output: Cell<Option<DeviceId>>,
    current_system: Cell<Option<DeviceId>>,
    volume_capable: RefCell<HashSet<u32>>,
    set_calls: RefCell<Vec<SetCall>>,
    fail_queries: Cell<bool>,
    fail_sets: Cell<bool>,
}

impl FakeHost {
    pub fn with_devices(devices: Vec<OutputDevice>) -> Self {
        Self {
            devices: RefCell::new(devices),
            ..Self::default()
        }
    }

    pub fn set_current_output(&self, id: Option<DeviceId>) {
        self.current_output.set(id);
    }

    pub fn set_current_system(&self, id: Option<DeviceId>) {
        self.current_system.set(id);
    }

    pub fn mark_volume_capable(&self, id: DeviceId) {
        self.volume_capable.borrow_mut().insert(id.0);
    }

    pub fn fail_queries(&self, fail: bool) {
        self.fail_queries.set(fail);
    }

    pub fn fail_sets(&self, fail: bool) {
        self.fail_sets.set(fail);
    }

    pub fn set_calls(&self) -> Vec<SetCall> {
        self.set_calls.borrow().clone()
    }
}

impl AudioHost for FakeHost {
    fn list_output_devices(&self) -> Vec<OutputDevice> {
        self.devices.borrow().clone()
    }

    fn default_output(&self) -> Result<DeviceId, HostQueryError> {
        if self.fail_queries.get() {
            return Err(HostQueryError::Status(-1));
        }
        self.current_output.get().ok_or(HostQueryError::Status(-1))
    }

    fn default_system_output(&self) -> Result<DeviceId, HostQueryError> {
        if self.fail_queries.get() {
            return Err(HostQueryError::Status(-1));
        }
        self.current_system.get().ok_or(HostQueryError::Status(-1))
    }

    fn set_default_output(&self, id: DeviceId) -> Result<(), HostQueryError> {
        if self.fail_sets.get() {
            return Err(HostQueryError::Status(-10851));
        }
        self.set_calls.borrow_mut().push(SetCall::Output(id));
        self.current_output.set(Some(id));
        Ok(())
    }

    fn set_default_system_output(&self, id: DeviceId) -> Result<(), HostQueryError> {
        if self.fail_sets.get() {
            return Err(HostQueryError::Status(-10851));
        }
        self.set_calls.borrow_mut().push(SetCall::System(id));
        self.current_system.set(Some(id));
        Ok(())
    }

    fn supports_main_volume(&self, id: DeviceId) -> bool {
        self.volume_capable.borrow().contains(&id.0)
    }
}

/// In-memory preference store
#[derive(Debug)]
pub(crate) struct FakePrefs {
    value: Cell<bool>,
}

impl FakePrefs {
    pub fn new(value: bool) -> Self {
        Self {
            value: Cell::new(value),
        }
    }
}

impl PreferenceStore for FakePrefs {
    fn bypass(&self) -> bool {
        self.value.get()
    }

    fn set_bypass(&self, value: bool) -> Result<()> {
        self.value.set(value);
        Ok(())
    }
}

/// Scripted mixer-process launcher
#[derive(Debug, Default)]
pub(crate) struct FakeLauncher {
    running: Cell<bool>,
    launch_calls: Cell<usize>,
    fail_launch: Cell<bool>,
}

impl FakeLauncher {
    pub fn running() -> Self {
        let launcher = Self::default();
        launcher.running.set(true);
        launcher
    }

    pub fn stopped() -> Self {
        Self::default()
    }

    pub fn fail_launch(&self, fail: bool) {
        self.fail_launch.set(fail);
    }

    pub fn launch_calls(&self) -> usize {
        self.launch_calls.get()
    }
}

impl AppLauncher for FakeLauncher {
    fn is_running(&self) -> bool {
        self.running.get()
    }

    fn launch(&self) -> Result<()> {
        self.launch_calls.set(self.launch_calls.get() + 1);
        if self.fail_launch.get() {
            bail!("launch facility unavailable");
        }
        self.running.set(true);
        Ok(())
    }
}

/// Scripted automation channel recording every attempted candidate
#[derive(Debug, Default)]
pub(crate) struct FakeAutomation {
    attempts: RefCell<Vec<String>>,
    succeed_on: Option<String>,
}

impl FakeAutomation {
    pub fn all_fail() -> Self {
        Self::default()
    }

    pub fn succeed_on(needle: &str) -> Self {
        Self {
            attempts: RefCell::new(Vec::new()),
            succeed_on: Some(needle.to_string()),
        }
    }

    pub fn attempts(&self) -> Vec<String> {
        self.attempts.borrow().clone()
    }
}

impl AutomationChannel for FakeAutomation {
    fn select_output_device(&self, needle: &str) -> Result<(), AutomationFailure> {
        self.attempts.borrow_mut().push(needle.to_string());
        if self.succeed_on.as_deref() == Some(needle) {
            Ok(())
        } else {
            Err(AutomationFailure::ScriptFailed {
                code: 1,
                stderr: "Not authorized to send Apple events".to_string(),
            })
        }
    }
}
