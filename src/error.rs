//! Domain error types
//!
//! All three kinds are soft failures: callers catch them at the point of use,
//! log, and continue, because reconciliation is retried on the next topology
//! event. None of them ever aborts the process.

use thiserror::Error;

/// A host audio property get/set failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HostQueryError {
    /// The underlying property call returned a non-zero status code
    #[error("audio host property call failed with status {0}")]
    Status(i32),

    /// No real audio host backend exists on this platform
    #[error("audio host is not available on this platform")]
    Unsupported,
}

/// The external automation channel could not steer the mixer application
#[derive(Debug, Error)]
pub enum AutomationFailure {
    /// The automation runner itself could not be spawned
    #[error("failed to invoke automation runner: {0}")]
    Spawn(#[from] std::io::Error),

    /// The script ran but exited non-zero (e.g. missing Automation permission,
    /// or no device matched inside the mixer)
    #[error("automation script exited with status {code}: {stderr}")]
    ScriptFailed { code: i32, stderr: String },
}

/// Name-substring resolution yielded no match in the current device list
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no output device matches any of {candidates:?}")]
pub struct DeviceNotFound {
    pub candidates: Vec<String>,
}
