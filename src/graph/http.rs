//! HTTP utilities for Microsoft Graph REST calls

use crate::error::RequestError;
use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::Value;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

pub const CONSISTENCY_LEVEL_HEADER: &str = "ConsistencyLevel";

const USER_AGENT: &str = concat!("intune-assign/", env!("CARGO_PKG_VERSION"));

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
pub(crate) fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// HTTP client wrapper for Graph API calls
#[derive(Clone)]
pub struct GraphHttpClient {
    client: Client,
}

impl GraphHttpClient {
    /// Create a new HTTP client
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Access to the underlying client (token endpoint calls)
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Make a GET request to the Graph API
    pub async fn get(&self, url: &str, token: &str) -> Result<Value, RequestError> {
        self.send(url, token, false).await
    }

    /// GET with `ConsistencyLevel: eventual`, required by advanced directory queries
    pub async fn get_eventual(&self, url: &str, token: &str) -> Result<Value, RequestError> {
        self.send(url, token, true).await
    }

    async fn send(&self, url: &str, token: &str, eventual: bool) -> Result<Value, RequestError> {
        if url.is_empty() {
            return Err(RequestError::EmptyUrl);
        }

        tracing::debug!("GET {}", url);

        let mut request = self.client.get(url).bearer_auth(token);
        if eventual {
            request = request.header(CONSISTENCY_LEVEL_HEADER, "eventual");
        }
        let response = request
            .send()
            .await
            .map_err(|e| RequestError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RequestError::Transport(e.to_string()))?;

        if !status.is_success() {
            // Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::debug!("API error: {} - {}", status, sanitize_for_log(&body));
            return Err(RequestError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        if body.is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).map_err(|e| RequestError::Decode(e.to_string()))
    }
}

/// Format a Graph error for display
/// Maps common HTTP failures to operator-friendly hints
pub fn format_graph_error(error: &RequestError) -> String {
    let hint = match error.status() {
        Some(401) => Some("Authentication failed. Check the tenant, client ID and secret."),
        Some(403) => Some(
            "Permission denied. The app registration needs Group.Read.All \
             and DeviceManagement*.Read.All.",
        ),
        Some(404) => Some("Resource not found."),
        Some(429) => Some("Request throttled by Microsoft Graph."),
        Some(400) => Some("Invalid request. Check your parameters."),
        Some(500) | Some(502) | Some(503) | Some(504) => {
            Some("Microsoft Graph temporarily unavailable.")
        }
        _ => None,
    };
    if let Some(hint) = hint {
        return hint.to_string();
    }

    let error_str = error.to_string();
    let sanitized = error_str
        .chars()
        .filter(|c| c.is_ascii_graphic() || *c == ' ')
        .take(120)
        .collect::<String>();

    if sanitized.len() < error_str.len() {
        format!("{}...", sanitized)
    } else {
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_truncates_long_bodies() {
        let body = "x".repeat(500);
        let sanitized = sanitize_for_log(&body);
        assert!(sanitized.contains("[truncated, 500 bytes total]"));
        assert!(sanitized.len() < 300);
    }

    #[test]
    fn test_sanitize_strips_control_characters() {
        assert_eq!(sanitize_for_log("bad\r\nbody\t!"), "badbody!");
    }

    #[test]
    fn test_format_graph_error_hints() {
        let err = RequestError::Status {
            status: 403,
            url: "u".to_string(),
        };
        assert!(format_graph_error(&err).starts_with("Permission denied"));

        let err = RequestError::Status {
            status: 429,
            url: "u".to_string(),
        };
        assert!(format_graph_error(&err).contains("throttled"));

        let err = RequestError::Decode("expected value at line 1".to_string());
        assert!(format_graph_error(&err).contains("expected value"));
    }
}
