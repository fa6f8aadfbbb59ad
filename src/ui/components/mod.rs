//! Box body renderers, one per dashboard view.

mod allowance_view;
mod metric_row;
mod progress_bar;
mod quota_view;

use chrono::{DateTime, Utc};

use usagedash_core::state::{TabState, ViewId};

use crate::ui::layout::RenderLine;
use crate::ui::theme::{paint, DIM, RED};

pub use allowance_view::AllowanceView;
pub use metric_row::{format_remaining, needs_compact, reset_display, MetricRow, RESETTING};
pub use progress_bar::{ProgressBar, BAR_WIDTH};
pub use quota_view::QuotaView;

/// Text of the placeholder row shown before the first fetch completes
pub const LOADING: &str = "loading...";

/// Produces the body rows of the box for one view
pub trait ViewRenderer {
    /// Body rows for `tab` at interior width `width`
    fn render(&self, tab: &TabState, width: usize, now: DateTime<Utc>) -> Vec<RenderLine>;
}

/// Renderer used for `view`
pub fn renderer_for(view: ViewId) -> &'static dyn ViewRenderer {
    match view {
        ViewId::Claude => &QuotaView,
        ViewId::Cursor => &AllowanceView,
    }
}

/// Rows for the error and not-yet-loaded states, shared by every view.
///
/// Returns `None` when the tab holds a payload to render.
fn status_lines(tab: &TabState) -> Option<Vec<RenderLine>> {
    if let Some(error) = &tab.last_error {
        return Some(vec![RenderLine::left(paint(RED, error))]);
    }
    if tab.payload.is_none() {
        return Some(vec![
            RenderLine::center(paint(DIM, LOADING)),
            RenderLine::blank(),
        ]);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_view_has_a_renderer() {
        let tab = TabState::default();
        for view in ViewId::ALL {
            let lines = renderer_for(view).render(&tab, 60, Utc::now());
            assert_eq!(lines.len(), 2, "{:?} loading state", view);
        }
    }

    #[test]
    fn test_error_is_single_red_row() {
        let tab = TabState {
            payload: None,
            last_update: "10:00".to_string(),
            last_error: Some("connection refused".to_string()),
        };
        for view in ViewId::ALL {
            let lines = renderer_for(view).render(&tab, 60, Utc::now());
            assert_eq!(lines, vec![RenderLine::left(paint(RED, "connection refused"))]);
        }
    }
}
