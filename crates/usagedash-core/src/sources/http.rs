//! Blocking HTTP helper shared by the usage sources.

use std::time::Duration;

use tracing::debug;

use super::SourceError;
use crate::usage::extract_error_message;

/// GET `url` and return the body of a 2xx response.
///
/// Non-2xx responses become errors carrying the server's message and the
/// status code; 401/403 are reported as credential errors.
pub(crate) fn get_text(
    url: &str,
    headers: &[(&str, String)],
    timeout: Duration,
) -> Result<String, SourceError> {
    let mut request = ureq::get(url);
    for (name, value) in headers {
        request = request.header(*name, value.as_str());
    }

    let mut response = request
        .config()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .call()
        .map_err(|e| SourceError::Transport(e.to_string()))?;

    let status = response.status().as_u16();
    let body = response
        .body_mut()
        .read_to_string()
        .map_err(|e| SourceError::Transport(e.to_string()))?;

    debug!("GET {} -> {} ({} bytes)", url, status, body.len());

    if (200..300).contains(&status) {
        return Ok(body);
    }
    Err(status_error(status, &body))
}

/// Build the error for a non-2xx response
pub(crate) fn status_error(status: u16, body: &str) -> SourceError {
    let message = extract_error_message(body);
    let message = if message.is_empty() {
        format!("HTTP {}", status)
    } else {
        format!("{} (HTTP {})", message, status)
    };
    match status {
        401 | 403 => SourceError::Credential(message),
        _ => SourceError::Transport(message),
    }
}
