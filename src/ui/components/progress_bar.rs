//! Fixed-width two-tone utilization bar.

use crossterm::style::{ResetColor, SetForegroundColor};

use crate::ui::theme::{Severity, DIM};

/// Number of cells in every bar
pub const BAR_WIDTH: usize = 12;
/// Cell used for the filled part
pub const BAR_FILLED: char = '█';
/// Cell used for the remainder
pub const BAR_EMPTY: char = '░';

/// Progress bar renderer
pub struct ProgressBar;

impl ProgressBar {
    /// Filled cells for `percent`: `percent * BAR_WIDTH / 100`, clamped to the bar
    pub fn filled_cells(percent: u32) -> usize {
        (percent as usize).saturating_mul(BAR_WIDTH) / 100
    }

    /// Render the bar: filled cells in the severity color, the rest dimmed
    pub fn render(percent: u32) -> String {
        let filled = Self::filled_cells(percent).min(BAR_WIDTH);
        format!(
            "{}{}{}{}{}",
            SetForegroundColor(Severity::from_percent(percent).color()),
            BAR_FILLED.to_string().repeat(filled),
            SetForegroundColor(DIM),
            BAR_EMPTY.to_string().repeat(BAR_WIDTH - filled),
            ResetColor
        )
    }

    /// Render an all-empty bar for a metric with no reported utilization
    pub fn render_unknown() -> String {
        format!(
            "{}{}{}",
            SetForegroundColor(DIM),
            BAR_EMPTY.to_string().repeat(BAR_WIDTH),
            ResetColor
        )
    }
}
