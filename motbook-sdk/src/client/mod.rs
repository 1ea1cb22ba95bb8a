//! HTTP clients for the booking backend.
//!
//! Gated behind the `client` cargo feature so downstream crates that only
//! need the shared types do not pull in `reqwest`.

mod admin;
mod booking;

pub use admin::AdminClient;
pub use booking::BookingClient;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::config::ApiConfig;
use crate::objects::{ApiEnvelope, ErrorBody, FALLBACK_ERROR_MESSAGE};

/// Errors produced by the SDK HTTP clients.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level failure (DNS, TLS, connection reset, …).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server returned a non-2xx status code.
    #[error("api error: status {status}, message: {message}")]
    Api { status: StatusCode, message: String },

    /// The server answered 2xx but reported the operation as unsuccessful.
    #[error("request rejected: {message}")]
    Rejected { status_code: u16, message: String },

    /// A successful envelope carried no `data`.
    #[error("response carried no data")]
    MissingData,

    /// Response body could not be deserialized.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The base URL could not be joined with the endpoint path.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

impl ClientError {
    /// Message the backend gave for this failure, if any.
    ///
    /// Transport and decoding failures have no backend message; callers fall
    /// back to their own wording.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            ClientError::Api { message, .. } | ClientError::Rejected { message, .. } => {
                Some(message.as_str())
            }
            _ => None,
        }
    }

    /// Whether the backend answered and refused the request, as opposed to
    /// the request never getting an answer.
    pub fn is_rejection(&self) -> bool {
        self.is_unauthorized() || matches!(self, ClientError::Rejected { .. })
    }

    /// Whether the backend refused the credentials used.
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            ClientError::Api { status, .. }
                if *status == StatusCode::UNAUTHORIZED || *status == StatusCode::FORBIDDEN
        )
    }
}

/// Build the `reqwest::Client` described by `config`.
pub(crate) fn build_http_client(config: &ApiConfig) -> Result<reqwest::Client, ClientError> {
    Ok(reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()?)
}

/// Decode a response into its envelope.
///
/// Non-2xx statuses become [`ClientError::Api`] carrying the backend
/// `message` when the body has one.
async fn parse_envelope<T: DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<ApiEnvelope<T>, ClientError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|err| err.message)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| {
                if body.trim().is_empty() {
                    FALLBACK_ERROR_MESSAGE.to_string()
                } else {
                    body
                }
            });
        return Err(ClientError::Api { status, message });
    }
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(ClientError::Json)
}

/// Decode a response and return its `data` payload.
async fn parse_data<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ClientError> {
    parse_envelope::<T>(resp)
        .await?
        .data
        .ok_or(ClientError::MissingData)
}

/// Decode a response and require `success` plus a `data` payload.
async fn parse_success<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ClientError> {
    let envelope = parse_envelope::<T>(resp).await?;
    if !envelope.success {
        return Err(rejected(&envelope));
    }
    envelope.data.ok_or(ClientError::MissingData)
}

fn rejected<T>(envelope: &ApiEnvelope<T>) -> ClientError {
    ClientError::Rejected {
        status_code: envelope.status_code,
        message: envelope.message_or_fallback().to_string(),
    }
}

/// Accept any 2xx response, ignoring its body.
async fn parse_ack(resp: reqwest::Response) -> Result<(), ClientError> {
    let status = resp.status();
    if !status.is_success() {
        // Reuse the error-body handling of `parse_envelope`.
        parse_envelope::<serde::de::IgnoredAny>(resp).await?;
    }
    Ok(())
}

/// Percent-encode a value used as a single path segment.
fn path_segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}
