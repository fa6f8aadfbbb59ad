use chrono::{DateTime, Utc};

use usagedash_core::state::TabState;
use usagedash_core::usage::UsagePayload;

use super::metric_row::{needs_compact, MetricRow};
use super::{status_lines, ViewRenderer};
use crate::ui::layout::RenderLine;
use crate::ui::theme::{paint, DIM};

/// Cursor view: premium requests, billing period and dollar allowance
pub struct AllowanceView;

impl AllowanceView {
    /// Row framing spend against the included allowance
    fn allowance_row(payload: &UsagePayload) -> Option<MetricRow> {
        let allowance = payload.allowance.as_ref()?;
        Some(MetricRow::new(
            "Spend",
            Some(allowance.percent()),
            format!(
                "${:.2} / ${:.2}",
                allowance.spent_usd, allowance.included_usd
            ),
            "",
        ))
    }

    fn indented(indent: usize, text: &str) -> RenderLine {
        RenderLine::left(format!("{}{}", " ".repeat(indent), paint(DIM, text)))
    }
}

impl ViewRenderer for AllowanceView {
    fn render(&self, tab: &TabState, width: usize, now: DateTime<Utc>) -> Vec<RenderLine> {
        if let Some(lines) = status_lines(tab) {
            return lines;
        }
        let Some(payload) = &tab.payload else {
            return Vec::new();
        };

        let metric_rows: Vec<MetricRow> = payload
            .metrics
            .iter()
            .map(|m| MetricRow::from_metric(m, now))
            .collect();
        let allowance_row = Self::allowance_row(payload);

        let all_rows: Vec<MetricRow> = metric_rows
            .iter()
            .chain(allowance_row.iter())
            .cloned()
            .collect();
        let compact = needs_compact(&all_rows, width);

        let mut lines = Vec::new();
        for row in &metric_rows {
            lines.extend(row.lines(compact));
        }
        if let (Some(start), Some(first)) = (payload.period_start, metric_rows.first()) {
            let since = format!("since {}", start.format("%d %b"));
            lines.push(Self::indented(first.indent(), &since));
        }
        if let Some(row) = &allowance_row {
            lines.extend(row.lines(compact));
            let pending = payload
                .allowance
                .as_ref()
                .and_then(|a| a.pending_invoice_usd)
                .filter(|usd| *usd > 0.0);
            if let Some(usd) = pending {
                lines.push(Self::indented(
                    row.indent(),
                    &format!("pending invoice ${:.2}", usd),
                ));
            }
        }
        lines.push(RenderLine::blank());
        lines
    }
}
