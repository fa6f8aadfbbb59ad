//! Usage data model and response parsing.
//!
//! Every source maps its own response shape into a [`UsagePayload`]; the
//! renderer only ever sees this normalized form.

pub mod parser;
pub mod types;

pub use parser::{
    extract_error_message, parse_claude_usage, parse_cursor_usage, parse_timestamp,
};
pub use types::{Allowance, UsageMetric, UsagePayload};
