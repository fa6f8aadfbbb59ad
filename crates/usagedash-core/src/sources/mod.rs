//! Data sources feeding the dashboard.
//!
//! A view is fed by a [`CredentialSource`] and a [`UsageSource`]; the Claude
//! view additionally has a [`RenewalTrigger`] for expired sessions. Every
//! failure is reported as a [`SourceError`] carrying the one-line message
//! shown inside the view.

pub mod claude;
pub mod cursor;
mod http;
pub mod renewal;

use thiserror::Error;
use tracing::debug;

use crate::usage::UsagePayload;

pub use claude::{ClaudeCredentials, ClaudeUsage};
pub use cursor::{CursorCredentials, CursorUsage};
pub use renewal::ClaudeRenewal;

/// Substrings (lowercase) that mark an error as an expired or invalid credential
const AUTH_ERROR_MARKERS: &[&str] = &[
    "unauthorized",
    "invalid",
    "expired",
    "unauthenticated",
    "401",
];

/// Failure while obtaining usage data, grouped by origin
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// Missing, invalid or expired local credential
    #[error("{0}")]
    Credential(String),
    /// Network failure, timeout or unreadable response
    #[error("{0}")]
    Transport(String),
    /// Response decoded but lacks the expected fields
    #[error("{0}")]
    Schema(String),
    /// Unsupported platform or missing tool; permanent for this process
    #[error("{0}")]
    Environment(String),
}

impl SourceError {
    /// Environment errors will not change by retrying
    pub fn is_permanent(&self) -> bool {
        matches!(self, SourceError::Environment(_))
    }
}

/// Whether an error message looks like an expired or rejected credential
pub fn is_auth_error(message: &str) -> bool {
    let lower = message.to_lowercase();
    AUTH_ERROR_MARKERS.iter().any(|m| lower.contains(m))
}

/// Produces the token a [`UsageSource`] needs
pub trait CredentialSource {
    /// Return a non-empty token, or an error describing how to fix it
    fn fetch_token(&self) -> Result<String, SourceError>;
}

/// Fetches a usage payload with a token
pub trait UsageSource {
    /// Fetch current usage; bounded by the source's own timeout
    fn fetch_usage(&self, token: &str) -> Result<UsagePayload, SourceError>;
}

/// Refreshes an expired credential out of band
pub trait RenewalTrigger {
    /// Run the renewal helper; returns once it has finished or been stopped
    fn renew(&self) -> Result<(), SourceError>;
}

/// Credential and usage source pair for one view
pub struct Feed {
    credentials: Box<dyn CredentialSource>,
    usage: Box<dyn UsageSource>,
    /// Set once an environment error is seen; later fetches short-circuit
    permanent_failure: Option<SourceError>,
}

impl Feed {
    /// Pair a credential source with a usage source
    pub fn new(credentials: Box<dyn CredentialSource>, usage: Box<dyn UsageSource>) -> Self {
        Self {
            credentials,
            usage,
            permanent_failure: None,
        }
    }

    /// Fetch a token and then the usage payload
    pub fn fetch(&mut self) -> Result<UsagePayload, SourceError> {
        if let Some(err) = &self.permanent_failure {
            debug!("Skipping fetch after permanent failure: {}", err);
            return Err(err.clone());
        }

        let result = self
            .credentials
            .fetch_token()
            .and_then(|token| self.usage.fetch_usage(&token));

        if let Err(err) = &result {
            if err.is_permanent() {
                self.permanent_failure = Some(err.clone());
            }
        }
        result
    }
}
