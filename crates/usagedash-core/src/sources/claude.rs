//! Claude Pro data source: OAuth token from Claude Code's credential store,
//! usage from the Anthropic OAuth usage endpoint.

use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use serde::Deserialize;
use tracing::{debug, warn};

use super::http::get_text;
use super::{CredentialSource, SourceError, UsageSource};
use crate::usage::{parse_claude_usage, UsagePayload};

/// Same endpoint Claude Code's `/usage` command reads
pub const USAGE_API_URL: &str = "https://api.anthropic.com/api/oauth/usage";
/// Beta header required by the OAuth usage endpoint
pub const OAUTH_BETA_HEADER: &str = "oauth-2025-04-20";
/// macOS Keychain service name Claude Code stores its credentials under
pub const KEYCHAIN_SERVICE: &str = "Claude Code-credentials";

/// Upper bound for the Keychain lookup (macOS may show a permission prompt)
const KEYCHAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Where Claude Code keeps its OAuth credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaudeCredentials {
    /// macOS Keychain generic password
    Keychain,
    /// Plain JSON file (`~/.claude/.credentials.json` on Linux)
    File(PathBuf),
    /// No known location on this platform
    Unsupported,
}

impl ClaudeCredentials {
    /// Pick the credential store for the current platform
    pub fn detect() -> Self {
        if cfg!(target_os = "macos") {
            return Self::Keychain;
        }
        match dirs::home_dir() {
            Some(home) if cfg!(unix) => Self::File(home.join(".claude").join(".credentials.json")),
            _ => Self::Unsupported,
        }
    }

    fn read_raw(&self) -> Result<String, SourceError> {
        match self {
            Self::Keychain => read_keychain(),
            Self::File(path) => std::fs::read_to_string(path).map_err(|e| {
                debug!("Cannot read {:?}: {}", path, e);
                missing_credentials()
            }),
            Self::Unsupported => Err(SourceError::Environment(
                "Claude credentials are only supported on macOS and Linux.".to_string(),
            )),
        }
    }
}

impl CredentialSource for ClaudeCredentials {
    fn fetch_token(&self) -> Result<String, SourceError> {
        let raw = self.read_raw()?;
        parse_access_token(&raw)
    }
}

fn missing_credentials() -> SourceError {
    SourceError::Credential(
        "No Claude Code credentials. Run 'claude', sign in (OAuth in the browser) and restart."
            .to_string(),
    )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredCredentials {
    claude_ai_oauth: Option<OAuthBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OAuthBlock {
    access_token: Option<String>,
}

/// Extract `claudeAiOauth.accessToken` from stored credentials JSON
pub fn parse_access_token(raw: &str) -> Result<String, SourceError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(missing_credentials());
    }

    let creds: StoredCredentials = serde_json::from_str(raw).map_err(|_| {
        SourceError::Credential(
            "Stored Claude credentials are not valid JSON. Sign in to 'claude' again.".to_string(),
        )
    })?;

    let token = creds
        .claude_ai_oauth
        .and_then(|o| o.access_token)
        .map(|t| t.trim().to_string())
        .unwrap_or_default();

    if token.is_empty() || token == "null" {
        return Err(SourceError::Credential(
            "Claude Code has no access token stored. Close every 'claude' session, reopen it and sign in."
                .to_string(),
        ));
    }
    Ok(token)
}

/// Read the credentials blob from the macOS Keychain
fn read_keychain() -> Result<String, SourceError> {
    let mut child = Command::new("security")
        .args(["find-generic-password", "-s", KEYCHAIN_SERVICE, "-w"])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => SourceError::Environment(
                "'security' command not found (macOS only).".to_string(),
            ),
            _ => SourceError::Environment(format!("Cannot run 'security': {}", e)),
        })?;

    let start = Instant::now();
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if start.elapsed() >= KEYCHAIN_TIMEOUT => {
                warn!("Keychain lookup timed out");
                let _ = child.kill();
                let _ = child.wait();
                return Err(SourceError::Credential(
                    "Keychain did not respond. Run this in your own terminal and allow access if macOS asks."
                        .to_string(),
                ));
            }
            Ok(None) => std::thread::sleep(Duration::from_millis(50)),
            Err(e) => return Err(SourceError::Transport(format!("Keychain lookup failed: {}", e))),
        }
    };

    let mut output = String::new();
    if let Some(mut stdout) = child.stdout.take() {
        let _ = stdout.read_to_string(&mut output);
    }
    if !status.success() || output.trim().is_empty() {
        return Err(missing_credentials());
    }
    Ok(output)
}

/// Usage source backed by the Anthropic OAuth usage endpoint
#[derive(Debug, Clone)]
pub struct ClaudeUsage {
    timeout: Duration,
}

impl ClaudeUsage {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl UsageSource for ClaudeUsage {
    fn fetch_usage(&self, token: &str) -> Result<UsagePayload, SourceError> {
        let headers = [
            ("Authorization", format!("Bearer {}", token)),
            ("anthropic-beta", OAUTH_BETA_HEADER.to_string()),
            ("Content-Type", "application/json".to_string()),
        ];
        let body = get_text(USAGE_API_URL, &headers, self.timeout)?;
        parse_claude_usage(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_access_token() {
        let raw = r#"{"claudeAiOauth": {"accessToken": " sk-ant-oat01-abc ", "refreshToken": "r"}}"#;
        assert_eq!(parse_access_token(raw).unwrap(), "sk-ant-oat01-abc");
    }

    #[test]
    fn test_parse_access_token_missing() {
        assert!(matches!(
            parse_access_token(r#"{"claudeAiOauth": {}}"#),
            Err(SourceError::Credential(_))
        ));
        assert!(matches!(
            parse_access_token(r#"{"claudeAiOauth": {"accessToken": "null"}}"#),
            Err(SourceError::Credential(_))
        ));
        assert!(matches!(
            parse_access_token(""),
            Err(SourceError::Credential(_))
        ));
    }

    #[test]
    fn test_parse_access_token_not_json() {
        let err = parse_access_token("not json").unwrap_err();
        assert!(err.to_string().contains("not valid JSON"));
    }

    #[test]
    fn test_credentials_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".credentials.json");
        std::fs::write(&path, r#"{"claudeAiOauth": {"accessToken": "tok-123"}}"#).unwrap();

        let source = ClaudeCredentials::File(path);
        assert_eq!(source.fetch_token().unwrap(), "tok-123");
    }

    #[test]
    fn test_credentials_file_missing() {
        let source = ClaudeCredentials::File(PathBuf::from("/nonexistent/.credentials.json"));
        assert!(matches!(
            source.fetch_token(),
            Err(SourceError::Credential(_))
        ));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_detect_uses_home_on_linux() {
        let dir = tempfile::tempdir().unwrap();
        let detected = temp_env::with_var("HOME", Some(dir.path()), ClaudeCredentials::detect);
        assert_eq!(
            detected,
            ClaudeCredentials::File(dir.path().join(".claude").join(".credentials.json"))
        );
    }

    #[test]
    fn test_unsupported_is_permanent() {
        let err = ClaudeCredentials::Unsupported.fetch_token().unwrap_err();
        assert!(err.is_permanent());
    }
}
