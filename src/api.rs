//! HTTP helpers for the vault JSON API with consistent timeouts and error
//! handling. Feature clients use these helpers to avoid duplicating request setup.
//! The helpers do not store tokens; they only attach what callers pass in.

use crate::{
    auth::{error::ApiError, types::MessageResponse},
    APP_USER_AGENT,
};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Default request timeout (seconds) applied to every client.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
/// Maximum number of error body characters surfaced to the user.
const MAX_ERROR_CHARS: usize = 200;
/// Message shown when a rejection carries no usable text.
const UNKNOWN_ERROR: &str = "Unknown error";

/// Builds a client with the crate user agent and request timeout.
///
/// # Errors
/// Returns `ApiError::Config` if the TLS backend cannot be initialized.
pub fn http_client(timeout: Duration) -> Result<Client, ApiError> {
    Client::builder()
        .user_agent(APP_USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|err| ApiError::Config(format!("Failed to build HTTP client: {err}")))
}

/// Builds a URL from an explicit base URL and the provided path.
#[must_use]
pub fn build_url_with_base(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim();

    if base.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}

/// Maps transport errors into `ApiError::Network` with timeout detection.
pub(crate) fn map_request_error(err: &reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Network("Request timed out. Please try again.".to_string())
    } else {
        ApiError::Network(format!("Unable to reach the server: {err}"))
    }
}

/// Parses JSON responses and surfaces rejections with their server message.
pub(crate) async fn handle_json_response<T: DeserializeOwned>(
    response: Response,
) -> Result<T, ApiError> {
    if response.status().is_success() {
        response
            .json::<T>()
            .await
            .map_err(|err| ApiError::Parse(format!("Failed to decode response: {err}")))
    } else {
        Err(rejection(response).await)
    }
}

/// Accepts any success body and surfaces rejections with their server message.
pub(crate) async fn handle_empty_response(response: Response) -> Result<(), ApiError> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(rejection(response).await)
    }
}

/// Like `handle_json_response`, but treats 401/403 as an invalid session.
pub(crate) async fn handle_authorized_json_response<T: DeserializeOwned>(
    response: Response,
) -> Result<T, ApiError> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ApiError::Unauthorized {
            status: status.as_u16(),
        });
    }
    handle_json_response(response).await
}

async fn rejection(response: Response) -> ApiError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    ApiError::Rejected {
        status,
        message: error_message(&body),
    }
}

/// Prefers the `message` field of a JSON envelope, falling back to the raw body.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<MessageResponse>(body) {
        Ok(envelope) => envelope
            .message
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_ERROR.to_string()),
        Err(_) => sanitize_body(body),
    }
}

/// Sanitizes HTTP error bodies for user-facing messages by trimming and truncating.
fn sanitize_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        UNKNOWN_ERROR.to_string()
    } else {
        trimmed.chars().take(MAX_ERROR_CHARS).collect()
    }
}
