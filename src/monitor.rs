//! Topology change monitor
//!
//! Subscribes to the host's three notification channels and exposes them as a
//! single stream of triggers. Every trigger, regardless of which channel
//! fired, drives one full reconciliation pass: the coarse-graining keeps the
//! state machine simple and self-correcting, since a pass always recomputes
//! the desired end-state from scratch.

use color_eyre::eyre::Result;
use tokio::sync::mpsc;

use crate::host;

/// A reconciliation trigger. Carries no payload: passes never diff old vs.
/// new topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// The general-audio default-output slot changed
    DefaultOutputChanged,
    /// A device was plugged or unplugged
    DeviceListChanged,
    /// The system-sounds default-output slot changed
    DefaultSystemOutputChanged,
}

impl Trigger {
    #[must_use]
    pub fn describe(self) -> &'static str {
        match self {
            Self::DefaultOutputChanged => "default output changed",
            Self::DeviceListChanged => "device list changed",
            Self::DefaultSystemOutputChanged => "default system output changed",
        }
    }
}

/// Register host listeners and return the trigger stream.
///
/// Notifications are delivered asynchronously by the host; the daemon loop
/// receives them here and runs each pass to completion before taking the
/// next, so no two passes ever overlap.
///
/// # Errors
/// Returns an error if host listener registration fails.
pub fn subscribe() -> Result<mpsc::UnboundedReceiver<Trigger>> {
    let (tx, rx) = mpsc::unbounded_channel();
    host::install_topology_listeners(tx)?;
    Ok(rx)
}
