//! Reconciliation state machine
//!
//! One pass is one full, stateless evaluation: read the bypass preference,
//! snapshot the device list, compute the target default-output assignment,
//! and drive toward it with idempotent corrective actions. There is no hidden
//! memory of past passes, so convergence after a transient failure only needs
//! the next triggering event.

use tracing::{debug, warn};

use crate::config::RoutingConfig;
use crate::error::DeviceNotFound;
use crate::host::{AudioHost, DeviceSnapshot, OutputDevice, Slot, ensure_default_slot};
use crate::mixer::{AppLauncher, AutomationChannel, MixerController};
use crate::prefs::PreferenceStore;

/// Which routing mode a pass resolved to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Straight to the physical DAC (bypass on)
    Direct,
    /// Through the software mixer (bypass off)
    Mixed,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Direct => write!(f, "direct"),
            Self::Mixed => write!(f, "mixed"),
        }
    }
}

/// What a pass did, for logging and switch notifications
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassOutcome {
    pub mode: Mode,
    /// Display name of the device the pass drove toward, when one resolved
    pub target: Option<String>,
    /// Whether any default-slot assignment was actually changed
    pub changed: bool,
}

/// The reconciler, generic over its collaborators so the decision logic runs
/// against fakes in tests.
pub struct Reconciler<H, P, L, A> {
    host: H,
    prefs: P,
    mixer: MixerController<L, A>,
    routing: RoutingConfig,
}

impl<H, P, L, A> Reconciler<H, P, L, A>
where
    H: AudioHost,
    P: PreferenceStore,
    L: AppLauncher,
    A: AutomationChannel,
{
    pub fn new(host: H, prefs: P, mixer: MixerController<L, A>, routing: RoutingConfig) -> Self {
        Self {
            host,
            prefs,
            mixer,
            routing,
        }
    }

    /// Run one full reconciliation pass. Never fails: every host-call error
    /// is downgraded to a log line and retried on the next event.
    pub fn run_pass(&self) -> PassOutcome {
        let bypass = self.prefs.bypass();
        debug!(bypass, "reconciliation pass");
        if bypass {
            self.direct_mode()
        } else {
            self.mixed_mode()
        }
    }

    /// Direct mode: route straight to the DAC, falling back to the built-in
    /// speakers when no DAC candidate matches.
    fn direct_mode(&self) -> PassOutcome {
        let snapshot = DeviceSnapshot::capture(&self.host);

        match self.resolve_dac(&snapshot) {
            Ok(dac) => {
                if !self.host.supports_main_volume(dac.id) {
                    // Expected for USB DACs with hardware volume knobs; noted
                    // for diagnostics only, routing proceeds regardless.
                    debug!("'{}' exposes no master volume control", dac.name);
                }
                let out = ensure_default_slot(&self.host, Slot::Output, dac);
                let sys = ensure_default_slot(&self.host, Slot::SystemOutput, dac);
                PassOutcome {
                    mode: Mode::Direct,
                    target: Some(dac.name.clone()),
                    changed: out || sys,
                }
            }
            Err(e) => {
                debug!("{e}; falling back to built-in speakers");
                match snapshot.find_first(&self.routing.builtin_candidates) {
                    Some(builtin) => {
                        // Only the general-output slot moves here; the system
                        // slot is deliberately left alone in this branch.
                        let changed = ensure_default_slot(&self.host, Slot::Output, builtin);
                        PassOutcome {
                            mode: Mode::Direct,
                            target: Some(builtin.name.clone()),
                            changed,
                        }
                    }
                    None => {
                        warn!("no DAC and no built-in match; defaults left unchanged");
                        PassOutcome {
                            mode: Mode::Direct,
                            target: None,
                            changed: false,
                        }
                    }
                }
            }
        }
    }

    /// Mixed mode: mixer running, mixer as boundary device on both slots,
    /// mixer internally steered toward the DAC.
    fn mixed_mode(&self) -> PassOutcome {
        self.mixer.ensure_running();

        let snapshot = DeviceSnapshot::capture(&self.host);
        let changed = self.mixer.ensure_boundary_device(&self.host, &snapshot);
        self.mixer.select_physical_output(&self.routing.dac_candidates);

        PassOutcome {
            mode: Mode::Mixed,
            target: snapshot
                .find_by_substring(self.mixer.device_name())
                .map(|d| d.name.clone()),
            changed,
        }
    }

    /// One-shot override: force mixed-mode setup regardless of preference
    /// (`--set-default bgm`). Does not steer the mixer's internal routing.
    pub fn force_mixed(&self) {
        self.mixer.ensure_running();
        let snapshot = DeviceSnapshot::capture(&self.host);
        self.mixer.ensure_boundary_device(&self.host, &snapshot);
    }

    /// One-shot override: force direct routing to the DAC
    /// (`--set-default su1`). Silently no-ops when no DAC candidate matches.
    pub fn force_direct(&self) {
        let snapshot = DeviceSnapshot::capture(&self.host);
        match self.resolve_dac(&snapshot) {
            Ok(dac) => {
                ensure_default_slot(&self.host, Slot::Output, dac);
                ensure_default_slot(&self.host, Slot::SystemOutput, dac);
            }
            Err(e) => debug!("{e}; nothing to do"),
        }
    }

    /// One-shot override: set the general-output slot to the first device
    /// matching `needle`. When nothing matches, fall back to a full pass
    /// using the persisted preference.
    pub fn set_named_default(&self, needle: &str) {
        let snapshot = DeviceSnapshot::capture(&self.host);
        match snapshot.find_by_substring(needle) {
            Some(dev) => {
                ensure_default_slot(&self.host, Slot::Output, dev);
            }
            None => {
                debug!("no device matches '{needle}'; running a normal pass");
                self.run_pass();
            }
        }
    }

    fn resolve_dac<'s>(
        &self,
        snapshot: &'s DeviceSnapshot,
    ) -> Result<&'s OutputDevice, DeviceNotFound> {
        snapshot
            .find_first(&self.routing.dac_candidates)
            .ok_or_else(|| DeviceNotFound {
                candidates: self.routing.dac_candidates.clone(),
            })
    }
}
