//! One metric row in wide or compact form, plus reset-time formatting.

use chrono::{DateTime, Local, Utc};

use usagedash_core::usage::UsageMetric;

use super::progress_bar::ProgressBar;
use crate::ui::layout::RenderLine;
use crate::ui::text::visible_len;
use crate::ui::theme::{paint, Severity, DIM, LABEL};

/// Shown instead of a duration once the reset instant has passed
pub const RESETTING: &str = "resetting";

/// Spaces before the label
const LEAD: usize = 2;
/// Spaces between label and bar
const LABEL_GAP: usize = 3;
/// Spaces between percentage and the detail text in wide form
const DETAIL_GAP: usize = 3;

/// Display pieces of one metric
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRow {
    label: String,
    percent: Option<u32>,
    /// Dimmed text after the percentage (wide) or on its own line (compact)
    detail: String,
    /// Text that always stays on the bar line
    trailer: String,
}

impl MetricRow {
    pub fn new(
        label: impl Into<String>,
        percent: Option<u32>,
        detail: impl Into<String>,
        trailer: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            percent,
            detail: detail.into(),
            trailer: trailer.into(),
        }
    }

    /// Row for a quota metric: reset info as detail, dollars as trailer
    pub fn from_metric(metric: &UsageMetric, now: DateTime<Utc>) -> Self {
        let detail = metric
            .resets_at
            .map(|at| reset_display(at, now))
            .unwrap_or_default();
        let trailer = metric
            .amount_usd
            .map(|usd| format!("  ${:.2}", usd))
            .unwrap_or_default();
        Self::new(metric.display_label(), metric.percent(), detail, trailer)
    }

    /// Column where the bar starts; compact detail lines are indented to it
    pub fn indent(&self) -> usize {
        LEAD + visible_len(&self.label) + LABEL_GAP
    }

    /// Label, bar and percentage
    fn head(&self) -> String {
        let (bar, pct) = match self.percent {
            Some(p) => (
                ProgressBar::render(p),
                paint(Severity::from_percent(p).color(), &format!("{}%", p)),
            ),
            None => (ProgressBar::render_unknown(), paint(DIM, "--")),
        };
        format!(
            "{}{}{}{}  {}",
            " ".repeat(LEAD),
            paint(LABEL, &self.label),
            " ".repeat(LABEL_GAP),
            bar,
            pct
        )
    }

    /// Single-line form
    pub fn wide(&self) -> String {
        if self.detail.is_empty() {
            return format!("{}{}", self.head(), self.trailer);
        }
        format!(
            "{}{}{}{}",
            self.head(),
            " ".repeat(DETAIL_GAP),
            paint(DIM, &self.detail),
            self.trailer
        )
    }

    /// Two-line form: bar line, then the detail indented beneath it
    pub fn compact(&self) -> [String; 2] {
        [
            format!("{}{}", self.head(), self.trailer),
            format!("{}{}", " ".repeat(self.indent()), paint(DIM, &self.detail)),
        ]
    }

    /// Lines for this row in the chosen form
    pub fn lines(&self, compact: bool) -> Vec<RenderLine> {
        if compact {
            self.compact().into_iter().map(RenderLine::left).collect()
        } else {
            vec![RenderLine::left(self.wide())]
        }
    }
}

/// Compact form is used when any row's wide form would overflow `width`
pub fn needs_compact(rows: &[MetricRow], width: usize) -> bool {
    rows.iter().any(|r| visible_len(&r.wide()) > width)
}

/// Time left until `resets_at`: `~{H}h {MM}m` under a day, `~{D}d {H}h` otherwise
pub fn format_remaining(resets_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (resets_at - now).num_seconds();
    if secs < 0 {
        return RESETTING.to_string();
    }
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    if hours >= 24 {
        format!("~{}d {}h", hours / 24, hours % 24)
    } else {
        format!("~{}h {:02}m", hours, minutes)
    }
}

/// Local wall-clock time of the reset; the weekday is added when it is a day or more away
pub fn format_reset_local(resets_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let local = resets_at.with_timezone(&Local);
    if (resets_at - now).num_hours() >= 24 {
        local.format("%a %H:%M").to_string()
    } else {
        local.format("%H:%M").to_string()
    }
}

/// Remaining time plus local reset time, e.g. `~2h 00m (14:30)`
pub fn reset_display(resets_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let remaining = format_remaining(resets_at, now);
    if remaining == RESETTING {
        return remaining;
    }
    format!("{} ({})", remaining, format_reset_local(resets_at, now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::theme::RED;
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 8, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_format_remaining() {
        let now = now();
        assert_eq!(format_remaining(now + Duration::hours(2), now), "~2h 00m");
        assert_eq!(
            format_remaining(now + Duration::minutes(95), now),
            "~1h 35m"
        );
        assert_eq!(format_remaining(now, now), "~0h 00m");
        assert_eq!(
            format_remaining(now + Duration::hours(24), now),
            "~1d 0h"
        );
        assert_eq!(
            format_remaining(now + Duration::hours(77) + Duration::minutes(59), now),
            "~3d 5h"
        );
        assert_eq!(
            format_remaining(now - Duration::seconds(1), now),
            RESETTING
        );
    }

    #[test]
    fn test_reset_display() {
        let now = now();
        let at = now + Duration::hours(2);
        let expected = format!("~2h 00m ({})", at.with_timezone(&Local).format("%H:%M"));
        assert_eq!(reset_display(at, now), expected);
        assert_eq!(reset_display(now - Duration::minutes(5), now), RESETTING);
    }

    #[test]
    fn test_reset_local_includes_weekday_when_far() {
        let now = now();
        let far = now + Duration::days(3);
        assert_eq!(
            format_reset_local(far, now),
            far.with_timezone(&Local).format("%a %H:%M").to_string()
        );
    }

    #[test]
    fn test_wide_row_critical_metric() {
        let now = now();
        let metric = UsageMetric::new("five_hour")
            .with_label("5h")
            .with_utilization(93.7)
            .with_reset(now + Duration::hours(2));

        let row = MetricRow::from_metric(&metric, now).wide();
        assert!(row.contains(&paint(RED, "93%")));
        assert!(row.contains("~2h 00m"));
        assert_eq!(
            crate::ui::text::strip_sgr(&row)
                .chars()
                .filter(|c| *c == '█')
                .count(),
            11
        );
    }

    #[test]
    fn test_compact_indent_follows_label_width() {
        let short = MetricRow::new("5h", Some(10), "~1h 00m", "");
        let long = MetricRow::new("Premium", Some(10), "since 01 Feb", "");
        assert_eq!(short.indent(), 7);
        assert_eq!(long.indent(), 12);

        let [_, detail] = long.compact();
        assert!(crate::ui::text::strip_sgr(&detail).starts_with(&" ".repeat(12)));
    }

    #[test]
    fn test_needs_compact() {
        let rows = vec![MetricRow::new("5h", Some(40), "~4h 10m (16:10)", "  $1.00")];
        let wide_len = visible_len(&rows[0].wide());
        assert!(!needs_compact(&rows, wide_len));
        assert!(needs_compact(&rows, wide_len - 1));
        assert_eq!(rows[0].lines(true).len(), 2);
        assert_eq!(rows[0].lines(false).len(), 1);
    }

    #[test]
    fn test_missing_percent_renders_placeholder() {
        let row = MetricRow::new("7d", None, "", "").wide();
        assert!(row.contains(&paint(DIM, "--")));
        assert!(!row.contains('%'));
    }
}
