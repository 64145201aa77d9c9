//! Desktop notifications
//!
//! Best-effort notifications for daemon lifecycle and routing switches.
//! Failures are logged by callers and never interrupt a pass.

use color_eyre::eyre::{Context, Result};
use notify_rust::Notification;

/// Send a desktop notification
///
/// # Errors
/// Returns an error if the notification cannot be delivered.
pub fn send_notification(summary: &str, body: &str) -> Result<()> {
    Notification::new()
        .summary(summary)
        .body(body)
        .appname("dacbridge")
        .timeout(3000)
        .show()
        .context("Failed to show notification")?;

    Ok(())
}
