//! Cursor data source: session token from Cursor's local state database,
//! usage from `cursor.com/api/usage`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, OpenFlags, OptionalExtension};
use serde_json::Value;
use tracing::debug;

use super::http::get_text;
use super::{CredentialSource, SourceError, UsageSource};
use crate::usage::{parse_cursor_usage, UsagePayload};

/// Usage endpoint behind the cursor.com dashboard
pub const CURSOR_USAGE_URL: &str = "https://cursor.com/api/usage";

/// Key of the access token inside Cursor's `ItemTable`
const ACCESS_TOKEN_KEY: &str = "cursorAuth/accessToken";

/// Separator between user id and access token in the session cookie (`::` URL-encoded)
const SESSION_SEPARATOR: &str = "%3A%3A";

/// Reads Cursor's access token from `state.vscdb`
#[derive(Debug, Clone)]
pub struct CursorCredentials {
    db_path: Option<PathBuf>,
}

impl CursorCredentials {
    /// Locate `state.vscdb` under the platform config directory
    /// (`~/Library/Application Support` on macOS, `~/.config` on Linux)
    pub fn detect() -> Self {
        Self {
            db_path: dirs::config_dir().map(|d| {
                d.join("Cursor")
                    .join("User")
                    .join("globalStorage")
                    .join("state.vscdb")
            }),
        }
    }

    /// Use an explicit database path
    pub fn with_db_path(path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: Some(path.into()),
        }
    }
}

impl CredentialSource for CursorCredentials {
    fn fetch_token(&self) -> Result<String, SourceError> {
        let Some(path) = &self.db_path else {
            return Err(SourceError::Environment(
                "Cursor is not supported on this platform.".to_string(),
            ));
        };
        if !path.is_file() {
            return Err(SourceError::Credential(
                "No Cursor credentials. Open Cursor, sign in and restart.".to_string(),
            ));
        }

        let access_token = read_access_token(path)?.ok_or_else(|| {
            SourceError::Credential(
                "No token stored by Cursor. Open Cursor, sign in and restart.".to_string(),
            )
        })?;
        session_token(&access_token)
    }
}

/// Read the raw access token from the state database
fn read_access_token(path: &Path) -> Result<Option<String>, SourceError> {
    let read_error = |e: rusqlite::Error| SourceError::Credential(format!("Error reading Cursor: {}", e));

    let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .map_err(read_error)?;
    let value: Option<SqlValue> = conn
        .query_row(
            "SELECT value FROM ItemTable WHERE key = ?1",
            [ACCESS_TOKEN_KEY],
            |row| row.get(0),
        )
        .optional()
        .map_err(read_error)?;

    // the column is declared BLOB but Cursor usually stores text
    let token = match value {
        Some(SqlValue::Text(text)) => Some(text),
        Some(SqlValue::Blob(bytes)) => String::from_utf8(bytes).ok(),
        _ => None,
    };

    debug!("Cursor token present: {}", token.is_some());
    Ok(token.filter(|t| !t.trim().is_empty()))
}

/// Build the `WorkosCursorSessionToken` value (`<user_id>%3A%3A<jwt>`)
pub fn session_token(access_token: &str) -> Result<String, SourceError> {
    let invalid = || {
        SourceError::Credential("Invalid Cursor token. Sign in to Cursor again.".to_string())
    };

    let payload = decode_jwt_payload(access_token).ok_or_else(invalid)?;
    let sub = match payload.get("sub") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return Err(invalid()),
    };
    let user_id = sub.split_once('|').map(|(_, id)| id).unwrap_or(&sub);
    if user_id.is_empty() {
        return Err(invalid());
    }

    Ok(format!("{}{}{}", user_id, SESSION_SEPARATOR, access_token))
}

/// Decode the claims segment of a JWT without verifying it
fn decode_jwt_payload(token: &str) -> Option<Value> {
    let claims = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(claims.trim_end_matches('=')).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// User id embedded in a session token
fn user_id(session_token: &str) -> &str {
    session_token
        .split_once(SESSION_SEPARATOR)
        .map(|(id, _)| id)
        .unwrap_or(session_token)
}

/// Usage source backed by `cursor.com/api/usage`
#[derive(Debug, Clone)]
pub struct CursorUsage {
    timeout: Duration,
}

impl CursorUsage {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl UsageSource for CursorUsage {
    fn fetch_usage(&self, token: &str) -> Result<UsagePayload, SourceError> {
        let url = format!("{}?user={}", CURSOR_USAGE_URL, user_id(token));
        let headers = [
            ("Cookie", format!("WorkosCursorSessionToken={}", token)),
            (
                "User-Agent",
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36".to_string(),
            ),
            ("Referer", "https://cursor.com/dashboard".to_string()),
            ("Accept", "application/json".to_string()),
        ];
        let body = get_text(&url, &headers, self.timeout)?;
        parse_cursor_usage(&body)
    }
}
