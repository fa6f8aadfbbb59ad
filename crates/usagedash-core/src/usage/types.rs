//! Usage data types shared by every data source.

use chrono::{DateTime, Utc};

/// A single usage metric (e.g., the 5-hour session window)
#[derive(Debug, Clone, PartialEq)]
pub struct UsageMetric {
    /// Source-defined key (e.g., "five_hour", "premium")
    pub key: String,
    /// Short display label (e.g., "5h"); the key is shown when absent
    pub label: Option<String>,
    /// Utilization in percent (0-100, may be fractional)
    pub utilization: Option<f64>,
    /// When this window resets
    pub resets_at: Option<DateTime<Utc>>,
    /// Dollars spent inside this window
    pub amount_usd: Option<f64>,
}

impl UsageMetric {
    /// Create a metric with only a key; every other field is absent
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: None,
            utilization: None,
            resets_at: None,
            amount_usd: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_utilization(mut self, utilization: f64) -> Self {
        self.utilization = Some(utilization);
        self
    }

    pub fn with_reset(mut self, resets_at: DateTime<Utc>) -> Self {
        self.resets_at = Some(resets_at);
        self
    }

    pub fn with_amount(mut self, amount_usd: f64) -> Self {
        self.amount_usd = Some(amount_usd);
        self
    }

    /// Label shown in the dashboard row
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.key)
    }

    /// Whole percent, truncated toward zero and floored at 0.
    ///
    /// `None` when the source did not report a utilization, which is
    /// distinct from reporting 0%.
    pub fn percent(&self) -> Option<u32> {
        self.utilization
            .filter(|u| u.is_finite())
            .map(|u| if u <= 0.0 { 0 } else { u.trunc() as u32 })
    }
}

/// Dollar spend against an included allowance
#[derive(Debug, Clone, PartialEq)]
pub struct Allowance {
    /// Dollars spent in the current period
    pub spent_usd: f64,
    /// Dollars included in the plan
    pub included_usd: f64,
    /// Partial invoice amount awaiting billing, if any
    pub pending_invoice_usd: Option<f64>,
}

impl Allowance {
    /// Spent-to-included ratio in whole percent, capped at 100
    pub fn percent(&self) -> u32 {
        if !self.spent_usd.is_finite() || self.spent_usd <= 0.0 {
            return 0;
        }
        if !self.included_usd.is_finite() || self.included_usd <= 0.0 {
            return 100;
        }
        let ratio = (self.spent_usd * 100.0 / self.included_usd).trunc();
        ratio.min(100.0) as u32
    }
}

/// Complete usage payload for one view, replaced wholesale on every fetch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsagePayload {
    /// Metrics in display order
    pub metrics: Vec<UsageMetric>,
    /// Monetary allowance framing, when the source reports one
    pub allowance: Option<Allowance>,
    /// Start of the current billing period
    pub period_start: Option<DateTime<Utc>>,
}

impl UsagePayload {
    /// Look up a metric by key
    pub fn metric(&self, key: &str) -> Option<&UsageMetric> {
        self.metrics.iter().find(|m| m.key == key)
    }
}
