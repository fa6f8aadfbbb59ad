//! Box layout: borders, body rows and the navigation hint.

use std::io::IsTerminal;

use chrono::{DateTime, Utc};
use crossterm::cursor::MoveTo;
use crossterm::terminal::{Clear, ClearType};

use usagedash_core::state::{DashboardState, ViewId};

use super::components::renderer_for;
use super::text::{pad_to_width, visible_len, Align};
use super::theme::{paint, ACCENT, DIM};

/// Interior width used when the terminal size is unavailable
pub const DEFAULT_INNER_WIDTH: usize = 78;

const TOP_LEFT: char = '┌';
const TOP_RIGHT: char = '┐';
const BOTTOM_LEFT: char = '└';
const BOTTOM_RIGHT: char = '┘';
const HORIZONTAL: char = '─';
const VERTICAL: char = '│';

/// One body row of the box, before borders and padding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderLine {
    pub text: String,
    pub align: Align,
}

impl RenderLine {
    pub fn new(text: impl Into<String>, align: Align) -> Self {
        Self {
            text: text.into(),
            align,
        }
    }

    pub fn left(text: impl Into<String>) -> Self {
        Self::new(text, Align::Left)
    }

    pub fn center(text: impl Into<String>) -> Self {
        Self::new(text, Align::Center)
    }

    pub fn blank() -> Self {
        Self::left(String::new())
    }
}

/// Interior width of the box for the current terminal.
///
/// Terminal columns minus the two border cells, or [`DEFAULT_INNER_WIDTH`]
/// when stdout is not a terminal or its size cannot be read.
pub fn inner_width() -> usize {
    if !std::io::stdout().is_terminal() {
        return DEFAULT_INNER_WIDTH;
    }
    match crossterm::terminal::size() {
        Ok((cols, _)) if cols > 2 => cols as usize - 2,
        _ => DEFAULT_INNER_WIDTH,
    }
}

/// Horizontal border with `label` embedded; the odd dash goes on the left
fn border(left: char, label: &str, right: char, width: usize) -> String {
    let dashes = width.saturating_sub(visible_len(label));
    let right_dashes = dashes / 2;
    let left_dashes = dashes - right_dashes;
    format!(
        "{}{}{}{}{}",
        left,
        HORIZONTAL.to_string().repeat(left_dashes),
        label,
        HORIZONTAL.to_string().repeat(right_dashes),
        right
    )
}

fn boxed(line: &RenderLine, width: usize) -> String {
    format!(
        "{}{}{}",
        VERTICAL,
        pad_to_width(&line.text, width, line.align),
        VERTICAL
    )
}

/// Every view name, the active one highlighted, between arrow hints
fn nav_hint(active: ViewId) -> RenderLine {
    let names: Vec<String> = ViewId::ALL
        .iter()
        .map(|view| {
            let color = if *view == active { ACCENT } else { DIM };
            paint(color, view.display_name())
        })
        .collect();
    RenderLine::center(format!("  ← {} →  ", names.join("   ")))
}

/// Rows of the frame for the active view, without the screen-clear prefix
pub fn frame_lines(state: &DashboardState, width: usize, now: DateTime<Utc>) -> Vec<String> {
    let tab = state.active_tab();
    let title = paint(ACCENT, &format!(" {} ", state.active.display_name()));

    let mut body = vec![RenderLine::blank()];
    body.extend(renderer_for(state.active).render(tab, width, now));
    body.push(nav_hint(state.active));

    let mut lines = Vec::with_capacity(body.len() + 3);
    lines.push(String::new());
    lines.push(border(TOP_LEFT, &title, TOP_RIGHT, width));
    lines.extend(body.iter().map(|l| boxed(l, width)));
    lines.push(border(
        BOTTOM_LEFT,
        &paint(DIM, &tab.last_update),
        BOTTOM_RIGHT,
        width,
    ));
    lines
}

/// Full repaint: clear the screen, home the cursor, draw every row
pub fn render_frame(state: &DashboardState, width: usize, now: DateTime<Utc>) -> String {
    let mut out = format!("{}{}", Clear(ClearType::All), MoveTo(0, 0));
    for line in frame_lines(state, width, now) {
        out.push_str(&line);
        out.push('\n');
    }
    out
}
