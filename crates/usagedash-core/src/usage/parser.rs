//! Map raw usage API responses into [`UsagePayload`].

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use super::types::{UsageMetric, UsagePayload};
use crate::sources::SourceError;

/// Request limit assumed when Cursor does not report one
pub const CURSOR_DEFAULT_REQUEST_LIMIT: f64 = 500.0;

/// One usage window from the Anthropic OAuth usage endpoint
#[derive(Debug, Default, Deserialize)]
struct ClaudeWindow {
    utilization: Option<f64>,
    resets_at: Option<String>,
    label: Option<String>,
    amount_spent: Option<f64>,
    spend: Option<f64>,
    dollars_used: Option<f64>,
}

impl ClaudeWindow {
    fn is_reported(&self) -> bool {
        self.utilization.is_some() || self.resets_at.is_some()
    }

    fn spent(&self) -> Option<f64> {
        self.amount_spent.or(self.spend).or(self.dollars_used)
    }

    fn into_metric(self, key: &str, default_label: &str) -> UsageMetric {
        let spent = self.spent();
        UsageMetric {
            key: key.to_string(),
            label: Some(self.label.unwrap_or_else(|| default_label.to_string())),
            utilization: self.utilization,
            resets_at: self.resets_at.as_deref().and_then(parse_timestamp),
            amount_usd: spent,
        }
    }
}

/// Top-level body of the Anthropic OAuth usage endpoint
#[derive(Debug, Default, Deserialize)]
struct ClaudeUsageResponse {
    five_hour: Option<ClaudeWindow>,
    seven_day: Option<ClaudeWindow>,
    extra_usage: Option<ClaudeWindow>,
    extra_hour: Option<ClaudeWindow>,
}

/// Parse the Anthropic OAuth usage response.
///
/// Expected shape:
/// ```text
/// {"five_hour": {"utilization": 93.7, "resets_at": "2026-02-08T04:59:59.000000+00:00"},
///  "seven_day": {"utilization": 21.0, "resets_at": "..."},
///  "extra_usage": {"utilization": 12.0, "amount_spent": 4.2}}
/// ```
pub fn parse_claude_usage(body: &str) -> Result<UsagePayload, SourceError> {
    let response: ClaudeUsageResponse = serde_json::from_str(body)
        .map_err(|e| SourceError::Schema(format!("Unexpected usage response: {}", e)))?;

    if response.five_hour.is_none() && response.seven_day.is_none() {
        return Err(SourceError::Schema(
            "Usage response has no five_hour or seven_day window".to_string(),
        ));
    }

    let mut metrics = Vec::new();
    if let Some(window) = response.five_hour {
        metrics.push(window.into_metric("five_hour", "5h"));
    }
    if let Some(window) = response.seven_day {
        metrics.push(window.into_metric("seven_day", "7d"));
    }
    if let Some(window) = response
        .extra_usage
        .filter(ClaudeWindow::is_reported)
        .or(response.extra_hour.filter(ClaudeWindow::is_reported))
    {
        metrics.push(window.into_metric("extra_usage", "Ex"));
    }

    Ok(UsagePayload {
        metrics,
        allowance: None,
        period_start: None,
    })
}

/// Parse the Cursor `/api/usage` response.
///
/// Premium requests live under the `gpt-4` key:
/// ```text
/// {"gpt-4": {"numRequests": 120, "maxRequestUsage": 500}, "startOfMonth": "2026-02-01T00:00:00.000Z"}
/// ```
pub fn parse_cursor_usage(body: &str) -> Result<UsagePayload, SourceError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| SourceError::Schema(format!("Unexpected Cursor response: {}", e)))?;
    let Some(root) = value.as_object() else {
        return Err(SourceError::Schema(
            "Cursor response is not a JSON object".to_string(),
        ));
    };

    let premium = root.get("gpt-4");
    let current = premium
        .and_then(|p| p.get("numRequests"))
        .and_then(Value::as_f64)
        .unwrap_or(0.0);
    let limit = premium
        .and_then(|p| p.get("maxRequestUsage"))
        .and_then(Value::as_f64)
        .unwrap_or(CURSOR_DEFAULT_REQUEST_LIMIT);
    let utilization = if limit > 0.0 {
        100.0 * current / limit
    } else {
        0.0
    };

    let period_start = root
        .get("startOfMonth")
        .and_then(Value::as_str)
        .and_then(parse_timestamp);

    Ok(UsagePayload {
        metrics: vec![UsageMetric::new("premium")
            .with_label("Premium")
            .with_utilization(utilization)],
        allowance: None,
        period_start,
    })
}

/// Parse an RFC 3339 timestamp (fractional seconds and `Z` accepted)
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Pull a readable message out of an HTTP error body.
///
/// Tries `error.message`, then a string `error`, then `message`, and
/// finally falls back to the raw body.
pub fn extract_error_message(body: &str) -> String {
    single_line(&raw_error_message(body.trim()))
}

/// Collapse newlines and whitespace runs so the message fits one row
fn single_line(message: &str) -> String {
    message.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn raw_error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return body.to_string();
    };

    let from_error = value.get("error").and_then(|e| match e {
        Value::String(s) => Some(s.clone()),
        Value::Object(_) => e.get("message").and_then(Value::as_str).map(str::to_string),
        _ => None,
    });

    from_error
        .or_else(|| {
            value
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_claude_usage() {
        let body = r#"{
            "five_hour": {"utilization": 93.7, "resets_at": "2026-02-08T04:59:59.000000+00:00"},
            "seven_day": {"utilization": 21.0, "resets_at": "2026-02-12T10:00:00Z"},
            "seven_day_opus": null,
            "extra_usage": {"utilization": 12.5, "amount_spent": 4.2, "is_enabled": true}
        }"#;

        let payload = parse_claude_usage(body).unwrap();
        assert_eq!(payload.metrics.len(), 3);

        let five = payload.metric("five_hour").unwrap();
        assert_eq!(five.display_label(), "5h");
        assert_eq!(five.percent(), Some(93));
        assert_eq!(
            five.resets_at,
            Some(Utc.with_ymd_and_hms(2026, 2, 8, 4, 59, 59).unwrap())
        );

        let seven = payload.metric("seven_day").unwrap();
        assert_eq!(seven.display_label(), "7d");
        assert_eq!(seven.percent(), Some(21));

        let extra = payload.metric("extra_usage").unwrap();
        assert_eq!(extra.display_label(), "Ex");
        assert_eq!(extra.amount_usd, Some(4.2));
    }

    #[test]
    fn test_parse_claude_usage_skips_unreported_extra() {
        let body = r#"{
            "five_hour": {"utilization": 10, "resets_at": null},
            "extra_usage": {"is_enabled": false, "utilization": null}
        }"#;

        let payload = parse_claude_usage(body).unwrap();
        assert_eq!(payload.metrics.len(), 1);
        assert!(payload.metric("extra_usage").is_none());
        assert!(payload.metrics[0].resets_at.is_none());
    }

    #[test]
    fn test_parse_claude_usage_extra_hour_fallback() {
        let body = r#"{
            "seven_day": {"utilization": 50},
            "extra_hour": {"utilization": 5, "label": "Extra", "dollars_used": 1.5}
        }"#;

        let payload = parse_claude_usage(body).unwrap();
        let extra = payload.metric("extra_usage").unwrap();
        assert_eq!(extra.display_label(), "Extra");
        assert_eq!(extra.amount_usd, Some(1.5));
    }

    #[test]
    fn test_parse_claude_usage_schema_errors() {
        assert!(matches!(
            parse_claude_usage("<html>"),
            Err(SourceError::Schema(_))
        ));
        assert!(matches!(
            parse_claude_usage(r#"{"unrelated": 1}"#),
            Err(SourceError::Schema(_))
        ));
    }

    #[test]
    fn test_parse_cursor_usage() {
        let body = r#"{
            "gpt-4": {"numRequests": 125, "maxRequestUsage": 500},
            "gpt-3.5-turbo": {"numRequests": 3, "maxRequestUsage": null},
            "startOfMonth": "2026-02-01T00:00:00.000Z"
        }"#;

        let payload = parse_cursor_usage(body).unwrap();
        let premium = payload.metric("premium").unwrap();
        assert_eq!(premium.display_label(), "Premium");
        assert_eq!(premium.percent(), Some(25));
        assert_eq!(
            payload.period_start,
            Some(Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_cursor_usage_default_limit() {
        let payload = parse_cursor_usage(r#"{"gpt-4": {"numRequests": 50}}"#).unwrap();
        assert_eq!(payload.metrics[0].percent(), Some(10));
        assert!(payload.period_start.is_none());

        let payload =
            parse_cursor_usage(r#"{"gpt-4": {"numRequests": 50, "maxRequestUsage": 0}}"#).unwrap();
        assert_eq!(payload.metrics[0].percent(), Some(0));
    }

    #[test]
    fn test_parse_cursor_usage_not_object() {
        assert!(matches!(
            parse_cursor_usage("[1, 2]"),
            Err(SourceError::Schema(_))
        ));
    }

    #[test]
    fn test_parse_timestamp() {
        assert!(parse_timestamp("2026-02-08T04:59:59.123456+00:00").is_some());
        assert!(parse_timestamp(" 2026-02-08T04:59:59Z ").is_some());
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("tomorrow").is_none());
    }

    #[test]
    fn test_extract_error_message() {
        assert_eq!(
            extract_error_message(r#"{"error": {"type": "authentication_error", "message": "OAuth token has expired"}}"#),
            "OAuth token has expired"
        );
        assert_eq!(
            extract_error_message(r#"{"error": "Not authenticated"}"#),
            "Not authenticated"
        );
        assert_eq!(
            extract_error_message(r#"{"message": "Rate limited"}"#),
            "Rate limited"
        );
        assert_eq!(extract_error_message("Bad Gateway"), "Bad Gateway");
    }

    #[test]
    fn test_extract_error_message_is_single_line() {
        assert_eq!(
            extract_error_message(
                "<html>\n<head><title>502 Bad Gateway</title></head>\n</html>\n"
            ),
            "<html> <head><title>502 Bad Gateway</title></head> </html>"
        );
        assert_eq!(
            extract_error_message(r#"{"error": {"message": "line one\n\n  line two"}}"#),
            "line one line two"
        );
    }
}
