//! Fallback backend for non-macOS builds
//!
//! Lets the crate build and its tests run on platforms without a `CoreAudio`
//! HAL. Reports no devices and no notification channels; every pass becomes a
//! no-op, matching the soft-failure policy.

use color_eyre::eyre::Result;
use tokio::sync::mpsc;
use tracing::warn;

use super::{AudioHost, DeviceId, OutputDevice};
use crate::error::HostQueryError;
use crate::monitor::Trigger;

#[derive(Debug, Default)]
pub struct StubHost;

impl AudioHost for StubHost {
    fn list_output_devices(&self) -> Vec<OutputDevice> {
        Vec::new()
    }

    fn default_output(&self) -> Result<DeviceId, HostQueryError> {
        Err(HostQueryError::Unsupported)
    }

    fn default_system_output(&self) -> Result<DeviceId, HostQueryError> {
        Err(HostQueryError::Unsupported)
    }

    fn set_default_output(&self, _device: DeviceId) -> Result<(), HostQueryError> {
        Err(HostQueryError::Unsupported)
    }

    fn set_default_system_output(&self, _device: DeviceId) -> Result<(), HostQueryError> {
        Err(HostQueryError::Unsupported)
    }

    fn supports_main_volume(&self, _device: DeviceId) -> bool {
        false
    }
}

pub fn install_topology_listeners(tx: mpsc::UnboundedSender<Trigger>) -> Result<()> {
    warn!("topology notifications are unavailable on this platform; the daemon will idle");
    // Keep the channel open so the daemon loop blocks instead of exiting.
    std::mem::forget(tx);
    Ok(())
}
