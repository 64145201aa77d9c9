//! Terminal styling utilities
//!
//! Semantic styling helpers over crossterm so CLI output stays visually
//! consistent: cyan for headers and technical identifiers, green/yellow/red
//! for status, dim for secondary information.

use crossterm::style::Stylize;

/// Extension trait for consistent dacbridge styling
pub trait BridgeStyle: Stylize {
    /// Section headers (cyan bold)
    fn header(self) -> <<Self as Stylize>::Styled as Stylize>::Styled
    where
        Self: Sized,
        <Self as Stylize>::Styled: Stylize,
    {
        self.cyan().bold()
    }

    /// Positive states: "yes", current defaults, confirmations (green)
    fn success(self) -> <Self as Stylize>::Styled
    where
        Self: Sized,
    {
        self.green()
    }

    /// Problems: missing devices, failed queries (red)
    fn error(self) -> <Self as Stylize>::Styled
    where
        Self: Sized,
    {
        self.red()
    }

    /// Partial or degraded states (yellow)
    fn warning(self) -> <Self as Stylize>::Styled
    where
        Self: Sized,
    {
        self.yellow()
    }

    /// Technical identifiers: device names, paths, flags (cyan)
    fn technical(self) -> <Self as Stylize>::Styled
    where
        Self: Sized,
    {
        self.cyan()
    }
}

// Blanket implementation for anything Stylize supports
impl<T: Stylize> BridgeStyle for T {}
