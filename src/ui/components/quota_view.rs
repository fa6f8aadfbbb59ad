use chrono::{DateTime, Utc};

use usagedash_core::state::TabState;

use super::metric_row::{needs_compact, MetricRow};
use super::{status_lines, ViewRenderer};
use crate::ui::layout::RenderLine;

/// Claude Pro view: one row per quota window (5h, 7d, extra usage)
pub struct QuotaView;

impl ViewRenderer for QuotaView {
    fn render(&self, tab: &TabState, width: usize, now: DateTime<Utc>) -> Vec<RenderLine> {
        if let Some(lines) = status_lines(tab) {
            return lines;
        }
        let Some(payload) = &tab.payload else {
            return Vec::new();
        };

        let rows: Vec<MetricRow> = payload
            .metrics
            .iter()
            .map(|m| MetricRow::from_metric(m, now))
            .collect();
        let compact = needs_compact(&rows, width);

        let mut lines: Vec<RenderLine> = rows.iter().flat_map(|r| r.lines(compact)).collect();
        lines.push(RenderLine::blank());
        lines
    }
}
