use reqwest::header::InvalidHeaderValue;
use reqwest::{Response, StatusCode};
use thiserror::Error;
use tracing::warn;

use crate::models::MediaKind;

/// A rejection reported by the trace.moe service itself.
///
/// Built once from a non-2xx response; the message is the body's `error`
/// field when the service sent one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("API error {status}: {message}")]
pub struct ApiError {
    message: String,
    status: u16,
}

impl ApiError {
    pub fn new(message: impl Into<String>, status: u16) -> Self {
        Self {
            message: message.into(),
            status,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// HTTP status code of the failed response.
    pub fn status(&self) -> u16 {
        self.status
    }
}

/// All errors that can occur when using the trace.moe client.
#[derive(Error, Debug)]
pub enum TraceMoeError {
    /// The service answered with a non-2xx status.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// No usable response reached the client (DNS, timeout, reset, bad body).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Reading the media file or writing a download failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The API key contains characters that cannot go into a header.
    #[error("invalid API key: {0}")]
    InvalidApiKey(#[from] InvalidHeaderValue),

    #[error("search result has no {0} URL")]
    MissingMediaUrl(MediaKind),
}

/// A convenience alias for `Result<T, TraceMoeError>`.
pub type Result<T> = std::result::Result<T, TraceMoeError>;

/// Pass a successful response through, or turn a non-2xx one into [`ApiError`].
///
/// Search, quota and media downloads all funnel through here. Transport
/// failures never reach this point; they surface from `send()` as
/// [`TraceMoeError::Http`].
pub(crate) async fn check_response(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let err = api_error_from_body(status, &body);
    warn!(status = err.status(), message = %err.message(), "trace.moe rejected request");
    Err(err.into())
}

pub(crate) fn api_error_from_body(status: StatusCode, body: &str) -> ApiError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .as_ref()
        .and_then(|b| b.get("error"))
        .and_then(|e| e.as_str())
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| generic_message(status));

    ApiError::new(message, status.as_u16())
}

fn generic_message(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => reason.to_string(),
        None => format!("HTTP {}", status.as_u16()),
    }
}
