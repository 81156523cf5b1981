//! HTTP utilities for GCP REST API calls

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Errors raised while talking to a GCP REST API
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("failed to obtain access token: {0:#}")]
    Auth(anyhow::Error),

    #[error("failed to send request: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API request failed: {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("failed to parse response JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// HTTP status of the failed call, if the server answered
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Request(err) => err.status(),
            _ => None,
        }
    }

    /// Whether the API reported that the resource does not exist
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}

/// Sanitize response body for logging
/// Truncates long responses and strips non-printable characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let cut: String = body.chars().take(MAX_LOG_BODY_LENGTH).collect();
        format!("{}... [truncated, {} bytes total]", cut, body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// Pull `error.message` out of a Google API error envelope
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("error")
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
        .map(|s| s.to_string())
}

/// HTTP client wrapper for GCP API calls
#[derive(Clone)]
pub struct GcpHttpClient {
    client: Client,
}

impl GcpHttpClient {
    /// Create a new HTTP client sending the given user agent
    pub fn new(user_agent: &str) -> Result<Self, ApiError> {
        let client = Client::builder().user_agent(user_agent).build()?;

        Ok(Self { client })
    }

    /// Make a GET request to a GCP API and decode the body
    pub async fn get<T: DeserializeOwned>(&self, url: &str, token: &str) -> Result<T, ApiError> {
        tracing::debug!("GET {}", url);

        let response = self.client.get(url).bearer_auth(token).send().await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            // Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::debug!("API error: {} - {}", status, sanitize_for_log(&body));
            let message = error_message(&body)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string());
            return Err(ApiError::Status { status, message });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

/// Format a GCP API error for display
/// Maps well-known status codes to actionable messages
pub fn format_gcp_error(error: &ApiError) -> String {
    let friendly = match error.status().map(|s| s.as_u16()) {
        Some(403) => "Permission denied. Check your GCP IAM permissions.",
        Some(401) => "Authentication failed. Run 'gcloud auth application-default login'.",
        Some(404) => "Resource not found.",
        Some(429) => "Rate limit exceeded. Please try again later.",
        Some(400) => "Invalid request. Check your parameters.",
        Some(500) | Some(503) => "GCP service temporarily unavailable. Please try again.",
        _ => "",
    };
    if !friendly.is_empty() {
        return friendly.to_string();
    }

    let error_str = error.to_string();

    // Truncate long error messages and remove non-printable data
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
    fn test_error_message_from_envelope() {
        let body = r#"{"error":{"code":404,"message":"The resource 'x' was not found"}}"#;
        assert_eq!(
            error_message(body).as_deref(),
            Some("The resource 'x' was not found")
        );
        assert_eq!(error_message("not json"), None);
    }

    #[test]
    fn test_sanitize_truncates_long_bodies() {
        let body = "a".repeat(500);
        let sanitized = sanitize_for_log(&body);
        assert!(sanitized.starts_with(&"a".repeat(MAX_LOG_BODY_LENGTH)));
        assert!(sanitized.contains("[truncated, 500 bytes total]"));
    }

    #[test]
    fn test_not_found_detection() {
        let err = ApiError::Status {
            status: StatusCode::NOT_FOUND,
            message: "gone".to_string(),
        };
        assert!(err.is_not_found());
        assert_eq!(format_gcp_error(&err), "Resource not found.");

        let err = ApiError::Status {
            status: StatusCode::BAD_GATEWAY,
            message: "upstream".to_string(),
        };
        assert!(!err.is_not_found());
        assert_eq!(format_gcp_error(&err), "API request failed: 502 Bad Gateway: upstream");
    }
}
