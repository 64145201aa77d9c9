//! Command-line interface definitions
//!
//! Uses clap for argument parsing with derive macros. The surface is a small
//! set of flags rather than subcommands; with no flags at all, the binary
//! runs a single reconciliation pass using the persisted preference.

use clap::{Parser, ValueEnum};

/// dacbridge - DAC Bridge
///
/// Arbitrates the default audio output between a software mixer and a
/// physical DAC.
#[derive(Parser)]
#[command(name = "dacbridge")]
#[command(version)]
#[command(about = "Arbitrates the default audio output between a software mixer and a physical DAC")]
#[command(after_help = "\
BEHAVIOR:
  - With no flags, runs one reconciliation pass using the persisted preference
  - bypass off (mixed mode): both default-output slots point at the software
    mixer, which internally forwards to the DAC
  - bypass on (direct mode): audio routes straight to the DAC, falling back to
    the built-in speakers when the DAC is unplugged
  - One-shot invocations exit zero even when a host call fails; the daemon
    retries every correction on the next topology event

EXAMPLES:
  dacbridge --daemon             Watch topology changes and reconcile forever
  dacbridge --bypass toggle      Flip the preference, then reconcile once
  dacbridge --set-default su1    Force direct routing to the DAC
  dacbridge --set-default bgm    Force mixed-mode setup
  dacbridge --set-default hdmi   Set default output to the first name match
  dacbridge --diagnose           Print every output device with its status

PERSISTED STATE:
  One key-value pair (bypass) in the per-user config directory.")]
pub struct Args {
    /// Run the change monitor and reconciler forever
    #[arg(long)]
    pub daemon: bool,

    /// Set or flip the persisted bypass preference
    #[arg(long, value_enum, value_name = "STATE")]
    pub bypass: Option<BypassArg>,

    /// One-shot override: "bgm", "su1", or a device-name substring
    #[arg(long = "set-default", value_name = "TARGET")]
    pub set_default: Option<String>,

    /// Print every output device with volume capability and default markers
    #[arg(long)]
    pub diagnose: bool,
}

/// Argument to `--bypass`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BypassArg {
    /// Direct mode: route straight to the DAC
    On,
    /// Mixed mode: route through the software mixer
    Off,
    /// Flip the current preference
    Toggle,
}
