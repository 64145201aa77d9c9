//! Audio host abstraction layer
//!
//! Narrow interface over the platform audio subsystem: device enumeration,
//! default-output slots, the master-volume capability probe, and topology
//! change notifications. The real backend uses `CoreAudio` on macOS; other
//! platforms get a stub so the decision logic and its tests build everywhere.

#[cfg(target_os = "macos")]
mod coreaudio;
#[cfg(not(target_os = "macos"))]
mod stub;

use color_eyre::eyre::Result;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::error::HostQueryError;
use crate::monitor::Trigger;

#[cfg(target_os = "macos")]
pub use coreaudio::CoreAudioHost as SystemHost;
#[cfg(not(target_os = "macos"))]
pub use stub::StubHost as SystemHost;

/// Opaque platform handle for an audio device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceId(pub u32);

/// An output device as seen during one reconciliation pass
///
/// Transient by design: re-queried on every pass and never cached across
/// passes, so an unplugged device cannot leave a stale handle behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDevice {
    pub id: DeviceId,
    pub name: String,
}

/// The two independent default-output slots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// General audio (`defaultOutput`)
    Output,
    /// System sounds (`defaultSystemOutput`)
    SystemOutput,
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Output => write!(f, "default output"),
            Self::SystemOutput => write!(f, "default system output"),
        }
    }
}

/// Interface to the host audio subsystem
///
/// Property reads/writes are synchronous and may block briefly on the audio
/// subsystem; callers run them on the single reconciliation context.
pub trait AudioHost {
    /// All output devices currently known to the host.
    ///
    /// Never fails: a host error yields an empty list.
    fn list_output_devices(&self) -> Vec<OutputDevice>;

    /// Device currently assigned to the general-audio slot.
    ///
    /// # Errors
    /// Returns [`HostQueryError`] if the underlying property call fails.
    fn default_output(&self) -> Result<DeviceId, HostQueryError>;

    /// Device currently assigned to the system-sounds slot.
    ///
    /// # Errors
    /// Returns [`HostQueryError`] if the underlying property call fails.
    fn default_system_output(&self) -> Result<DeviceId, HostQueryError>;

    /// Assign the general-audio slot.
    ///
    /// # Errors
    /// Returns [`HostQueryError`] if the underlying property call fails.
    fn set_default_output(&self, device: DeviceId) -> Result<(), HostQueryError>;

    /// Assign the system-sounds slot.
    ///
    /// # Errors
    /// Returns [`HostQueryError`] if the underlying property call fails.
    fn set_default_system_output(&self, device: DeviceId) -> Result<(), HostQueryError>;

    /// Whether the device exposes a controllable master volume.
    ///
    /// Checks the unified/virtual master-volume control first, then the
    /// legacy scalar volume control on the output scope. Pure query; the
    /// absence of a property is a normal negative result, not an error.
    fn supports_main_volume(&self, device: DeviceId) -> bool;
}

/// Point-in-time view of the output device list for one pass
#[derive(Debug, Clone, Default)]
pub struct DeviceSnapshot {
    devices: Vec<OutputDevice>,
}

impl DeviceSnapshot {
    /// Query the host for a fresh device list
    pub fn capture(host: &impl AudioHost) -> Self {
        Self {
            devices: host.list_output_devices(),
        }
    }

    #[cfg(test)]
    pub(crate) fn from_devices(devices: Vec<OutputDevice>) -> Self {
        Self { devices }
    }

    #[must_use]
    pub fn devices(&self) -> &[OutputDevice] {
        &self.devices
    }

    /// First device whose name contains `needle`, case-insensitively.
    ///
    /// Ties break on host enumeration order, which is host-defined and not
    /// guaranteed stable across OS versions.
    #[must_use]
    pub fn find_by_substring(&self, needle: &str) -> Option<&OutputDevice> {
        let needle = needle.to_lowercase();
        self.devices
            .iter()
            .find(|d| d.name.to_lowercase().contains(&needle))
    }

    /// Resolve an ordered candidate list, first candidate with a match wins
    #[must_use]
    pub fn find_first(&self, candidates: &[String]) -> Option<&OutputDevice> {
        candidates.iter().find_map(|c| self.find_by_substring(c))
    }
}

/// Capability decision behind [`AudioHost::supports_main_volume`]: the
/// unified/virtual master control is probed first; the legacy scalar volume
/// on the output scope is only consulted when that is absent. A device with
/// either control reports the capability.
pub fn probe_main_volume(
    has_virtual_main: impl FnOnce() -> bool,
    has_output_scalar: impl FnOnce() -> bool,
) -> bool {
    has_virtual_main() || has_output_scalar()
}

/// Drive one default-output slot toward `device`, skipping the set when the
/// slot already points there.
///
/// A failed read of the current assignment is treated as "unknown" and the
/// set is attempted anyway. Set failures are logged and swallowed; the next
/// pass retries. Returns whether a set call was actually issued and succeeded.
pub fn ensure_default_slot(host: &impl AudioHost, slot: Slot, device: &OutputDevice) -> bool {
    let current = match slot {
        Slot::Output => host.default_output(),
        Slot::SystemOutput => host.default_system_output(),
    };
    if current.is_ok_and(|cur| cur == device.id) {
        return false;
    }

    let result = match slot {
        Slot::Output => host.set_default_output(device.id),
        Slot::SystemOutput => host.set_default_system_output(device.id),
    };
    match result {
        Ok(()) => {
            info!("{slot} is now '{}'", device.name);
            true
        }
        Err(e) => {
            warn!("could not set {slot} to '{}': {e}", device.name);
            false
        }
    }
}

/// Register platform listeners for the three topology notification channels
/// (default-output changed, device-list changed, default-system-output
/// changed) and forward each as a [`Trigger`] on `tx`.
///
/// # Errors
/// Returns an error if listener registration fails on the real backend.
pub fn install_topology_listeners(tx: mpsc::UnboundedSender<Trigger>) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        coreaudio::install_topology_listeners(tx)
    }
    #[cfg(not(target_os = "macos"))]
    {
        stub::install_topology_listeners(tx)
    }
}
