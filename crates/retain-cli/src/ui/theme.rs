//! Console theme
//!
//! Colors, icons and column widths shared by the console reporter and the
//! end-of-run summary.

use crossterm::style::Color;

/// Default theme for retain's console output
#[derive(Debug, Clone, Default)]
pub struct Theme {
    /// Colors for different elements
    pub colors: ColorScheme,
    /// Status icons
    pub icons: Icons,
    /// Column widths
    pub layout: Layout,
}

/// Color scheme for console elements
#[derive(Debug, Clone)]
pub struct ColorScheme {
    /// Backup names
    pub artifact: Color,
    /// Dates and secondary info
    pub secondary: Color,
    /// Headers and labels
    pub header: Color,
    /// Kept backups and successful removals
    pub success: Color,
    /// Backups selected for deletion
    pub delete: Color,
    /// Warning states
    pub warning: Color,
    /// Error states
    pub error: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            artifact: Color::Cyan,
            secondary: Color::DarkGrey,
            header: Color::DarkGrey,
            success: Color::Green,
            delete: Color::Yellow,
            warning: Color::Yellow,
            error: Color::Red,
        }
    }
}

/// Status icons for different states
#[derive(Debug, Clone)]
pub struct Icons {
    /// Kept / removed (✓)
    pub success: &'static str,
    /// Would be removed on a live run (○)
    pub pending: &'static str,
    /// Failed (✗)
    pub error: &'static str,
    /// Warning (⚠)
    pub warning: &'static str,
    /// Info (ℹ)
    pub info: &'static str,
}

impl Default for Icons {
    fn default() -> Self {
        Self {
            success: "✓",
            pending: "○",
            error: "✗",
            warning: "⚠",
            info: "ℹ",
        }
    }
}

/// Column widths for the summary table
#[derive(Debug, Clone)]
pub struct Layout {
    /// Minimum width of the name column
    pub name_width: usize,
    /// Width of the date column
    pub date_width: usize,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            name_width: 24,
            date_width: 12,
        }
    }
}
