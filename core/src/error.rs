//! Error model for the WordPress client.
//!
//! # Design
//! Every failure that leaves the HTTP client is an `ApiError` carrying a
//! machine code, an HTTP status and a message. Failures are first described
//! as a `Failure` (the shapes a failure can arrive in) and then classified by
//! `normalize_error` in a fixed order:
//!
//! 1. an `ApiError` passes through untouched,
//! 2. a transport failure becomes `NETWORK_ERROR` with status 0,
//! 3. anything carrying a non-zero HTTP status becomes `HTTP_ERROR`,
//! 4. a WordPress error body (`{code, message, data}`) keeps its code,
//! 5. everything else becomes `UNKNOWN_ERROR` with status 500.

use serde_json::Value;
use thiserror::Error;

use crate::http::HttpResponse;
use crate::transport::TransportError;

pub const NETWORK_ERROR: &str = "NETWORK_ERROR";
pub const HTTP_ERROR: &str = "HTTP_ERROR";
pub const UNKNOWN_ERROR: &str = "UNKNOWN_ERROR";

const NETWORK_MESSAGE: &str = "Network error: Unable to connect to WordPress API";
const UNKNOWN_MESSAGE: &str = "An unknown error occurred";
const DEFAULT_REMOTE_STATUS: u16 = 500;

/// The normalized failure returned by every `WordPressClient` operation.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{code} ({status}): {message}")]
pub struct ApiError {
    pub message: String,
    /// `NETWORK_ERROR`, `HTTP_ERROR`, `UNKNOWN_ERROR`, or a code supplied by
    /// the remote API such as `rest_post_invalid_id`.
    pub code: String,
    /// HTTP status, 0 when no response was received.
    pub status: u16,
    pub raw_data: Option<Value>,
}

impl ApiError {
    pub fn new(message: impl Into<String>, code: impl Into<String>, status: u16) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            status,
            raw_data: None,
        }
    }

    pub fn is_network(&self) -> bool {
        self.code == NETWORK_ERROR
    }
}

/// The shapes a failure can take before normalization.
#[derive(Debug)]
pub enum Failure {
    /// Already normalized.
    Api(ApiError),
    /// No HTTP response was received.
    Transport(TransportError),
    /// Something that carries an HTTP status code.
    Status { status: u16, message: Option<String> },
    /// A WordPress-style error body.
    Remote {
        code: String,
        message: String,
        data: Option<Value>,
    },
    /// Anything else: malformed payloads, invalid URLs, serialization.
    Other(String),
}

impl Failure {
    /// Describe an arbitrary JSON error object.
    ///
    /// For callers holding an error payload outside a live response, such as
    /// one relayed by another service or read back from storage. The
    /// client's own responses go through `validate_http_response`, which
    /// always keeps the response status.
    ///
    /// A numeric non-zero `status` wins over a `{code, message}` pair, so
    /// objects carrying both are classified as HTTP errors.
    pub fn from_value(value: &Value) -> Self {
        if let Some(status) = value.get("status").and_then(Value::as_u64) {
            if status > 0 {
                return Failure::Status {
                    status: clamp_status(status),
                    message: value
                        .get("message")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                };
            }
        }

        let code = value.get("code").and_then(Value::as_str);
        let message = value.get("message").and_then(Value::as_str);
        match (code, message) {
            (Some(code), Some(message)) => Failure::Remote {
                code: code.to_string(),
                message: message.to_string(),
                data: value.get("data").cloned(),
            },
            _ => Failure::Other(value.to_string()),
        }
    }
}

impl From<ApiError> for Failure {
    fn from(err: ApiError) -> Self {
        Failure::Api(err)
    }
}

impl From<TransportError> for Failure {
    fn from(err: TransportError) -> Self {
        Failure::Transport(err)
    }
}

impl From<Failure> for ApiError {
    fn from(failure: Failure) -> Self {
        normalize_error(failure)
    }
}

/// Map any failure onto an `ApiError`. Total and idempotent.
pub fn normalize_error(failure: Failure) -> ApiError {
    match failure {
        Failure::Api(err) => err,
        Failure::Transport(err) => {
            tracing::debug!(error = %err, "transport failure");
            ApiError::new(NETWORK_MESSAGE, NETWORK_ERROR, 0)
        }
        Failure::Status { status, message } if status > 0 => {
            let message = message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| format!("HTTP Error {status}"));
            ApiError::new(message, HTTP_ERROR, status)
        }
        Failure::Remote {
            code,
            message,
            data,
        } if !code.is_empty() && !message.is_empty() => {
            let status = data
                .as_ref()
                .and_then(|data| data.get("status"))
                .and_then(Value::as_u64)
                .filter(|status| *status > 0)
                .map(clamp_status)
                .unwrap_or(DEFAULT_REMOTE_STATUS);
            ApiError {
                message,
                code,
                status,
                raw_data: data,
            }
        }
        other => {
            tracing::debug!(failure = ?other, "unclassified failure");
            ApiError::new(UNKNOWN_MESSAGE, UNKNOWN_ERROR, 500)
        }
    }
}

/// Pass 2xx responses through; turn anything else into an `ApiError`.
///
/// A JSON error body may override the default message and code. The status
/// is always the response status.
pub fn validate_http_response(response: HttpResponse) -> Result<HttpResponse, ApiError> {
    if response.is_success() {
        return Ok(response);
    }

    let mut err = ApiError::new(
        format!("HTTP {}: {}", response.status, response.status_text()),
        HTTP_ERROR,
        response.status,
    );

    if let Ok(body) = serde_json::from_str::<Value>(&response.body) {
        if let Some(message) = body.get("message").and_then(Value::as_str) {
            if !message.is_empty() {
                err.message = message.to_string();
            }
        }
        if let Some(code) = body.get("code").and_then(Value::as_str) {
            if !code.is_empty() {
                err.code = code.to_string();
            }
        }
        err.raw_data = Some(body);
    }

    Err(err)
}

fn clamp_status(status: u64) -> u16 {
    u16::try_from(status).unwrap_or(u16::MAX)
}
