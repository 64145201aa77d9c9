//! `dacbridge` - DAC Bridge
//!
//! Arbitrates which audio output device the machine uses, shuttling between a
//! software loopback/mixer device ("Background Music") and a physical DAC
//! based on a persisted `bypass` preference and device availability.
//!
//! # Modes
//! - **Mixed** (`bypass = false`): both default-output slots point at the
//!   software mixer, which internally forwards to the DAC
//! - **Direct** (`bypass = true`): audio routes straight to the DAC, falling
//!   back to the built-in speakers when the DAC is unplugged
//!
//! Every topology change triggers one full reconciliation pass. Passes are
//! stateless and idempotent: the daemon never diffs old vs. new topology, it
//! only recomputes the desired end-state and drives toward it. Host-call
//! failures are soft; any missed correction is retried on the next event.

pub mod cli;
pub mod commands;
pub mod config;
pub mod daemon;
pub mod error;
pub mod host;
pub mod mixer;
pub mod monitor;
pub mod notification;
pub mod prefs;
pub mod reconcile;
pub mod style;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-export commonly used types for convenience
pub use cli::Args;
pub use config::Config;
pub use reconcile::Reconciler;
