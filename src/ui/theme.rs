//! Colors and SGR styling helpers.

use crossterm::style::{Color, ResetColor, SetForegroundColor};

/// Severity: below 50%
pub const GREEN: Color = Color::Rgb {
    r: 166,
    g: 227,
    b: 161,
};
/// Severity: 50% and above
pub const YELLOW: Color = Color::Rgb {
    r: 249,
    g: 226,
    b: 175,
};
/// Severity: 70% and above
pub const PEACH: Color = Color::Rgb {
    r: 250,
    g: 179,
    b: 135,
};
/// Severity: 90% and above; also used for errors
pub const RED: Color = Color::Rgb {
    r: 243,
    g: 139,
    b: 168,
};
/// Secondary text, empty bar cells, inactive tabs
pub const DIM: Color = Color::Rgb {
    r: 127,
    g: 132,
    b: 156,
};
/// Titles and the active tab
pub const ACCENT: Color = Color::Rgb {
    r: 180,
    g: 190,
    b: 254,
};
/// Metric labels
pub const LABEL: Color = Color::Rgb {
    r: 166,
    g: 173,
    b: 200,
};

/// Wrap `text` in a foreground color followed by a full SGR reset
pub fn paint(color: Color, text: &str) -> String {
    format!("{}{}{}", SetForegroundColor(color), text, ResetColor)
}

/// Utilization severity tier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Nominal,
    Caution,
    Warning,
    Critical,
}

impl Severity {
    /// Highest threshold reached by `percent` wins
    pub fn from_percent(percent: u32) -> Self {
        if percent >= 90 {
            Severity::Critical
        } else if percent >= 70 {
            Severity::Warning
        } else if percent >= 50 {
            Severity::Caution
        } else {
            Severity::Nominal
        }
    }

    pub fn color(self) -> Color {
        match self {
            Severity::Nominal => GREEN,
            Severity::Caution => YELLOW,
            Severity::Warning => PEACH,
            Severity::Critical => RED,
        }
    }
}
