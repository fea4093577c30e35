use serde::Deserialize;
use serde_json::{Map, Value};

use crate::transport::http::{BoxError, HttpResponse};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
/// Failure surfaced from the network or API layer.
///
/// The shape is uniform across causes; `status_code` and `code` tell them apart:
/// - timeout: `408` / [`ApiError::REQUEST_TIMEOUT`],
/// - network failure (no HTTP response): `0` / [`ApiError::NETWORK_ERROR`],
/// - malformed success body: the response status / [`ApiError::INVALID_RESPONSE_FORMAT`],
/// - API-reported errors: the original HTTP status and whatever code the server sent.
pub struct ApiError {
    pub message: String,
    pub status_code: u16,
    pub code: Option<String>,
    pub details: Option<Map<String, Value>>,
    pub request_id: Option<String>,
}

impl ApiError {
    pub const REQUEST_TIMEOUT: &'static str = "REQUEST_TIMEOUT";
    pub const NETWORK_ERROR: &'static str = "NETWORK_ERROR";
    pub const INVALID_RESPONSE_FORMAT: &'static str = "INVALID_RESPONSE_FORMAT";

    pub fn new(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code,
            code: None,
            details: None,
            request_id: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub(crate) fn timeout() -> Self {
        Self::new(408, "Request timeout").with_code(Self::REQUEST_TIMEOUT)
    }

    pub(crate) fn network(cause: &BoxError) -> Self {
        Self::new(0, format!("Network error: {cause}")).with_code(Self::NETWORK_ERROR)
    }

    pub(crate) fn invalid_response(status_code: u16, message: impl Into<String>) -> Self {
        Self::new(status_code, message).with_code(Self::INVALID_RESPONSE_FORMAT)
    }

    /// Build an error from a non-2xx response.
    ///
    /// Reads the `{error: {code, message, details}, meta: {requestId}}` envelope when present and
    /// falls back to `HTTP <status>: <reason>` otherwise.
    pub(crate) fn from_error_response(response: &HttpResponse) -> Self {
        let fallback = format!("HTTP {}: {}", response.status, reason_phrase(response.status));

        let Ok(envelope) = response.json::<ErrorEnvelope>() else {
            return Self::new(response.status, fallback);
        };

        let (code, message, details) = match envelope.error {
            Some(body) => (body.code, body.message, body.details),
            None => (None, None, None),
        };

        Self {
            message: message.unwrap_or(fallback),
            status_code: response.status,
            code,
            details,
            request_id: envelope.meta.and_then(|meta| meta.request_id),
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.code.as_deref() == Some(Self::REQUEST_TIMEOUT)
    }

    pub fn is_network_error(&self) -> bool {
        self.code.as_deref() == Some(Self::NETWORK_ERROR)
    }

    pub fn is_invalid_response(&self) -> bool {
        self.code.as_deref() == Some(Self::INVALID_RESPONSE_FORMAT)
    }
}

fn reason_phrase(status: u16) -> &'static str {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|status| status.canonical_reason())
        .unwrap_or("Unknown Status")
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: Option<ErrorBody>,
    #[serde(default)]
    meta: Option<ErrorMeta>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorMeta {
    #[serde(default)]
    request_id: Option<String>,
}
