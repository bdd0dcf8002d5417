//! HTTP client for the vision `images:annotate` endpoint.
//!
//! Wraps `reqwest` with API key handling, retry on transient failures, and
//! typed response deserialization. Error envelopes from the API surface as
//! [`VisionError::Api`].

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use shopaudit_core::vision::Status;
use shopaudit_core::AnnotateResponse;

use crate::error::VisionError;
use crate::retry::{is_retriable_status, retry_with_backoff};
use crate::types::{AnnotateRequest, ImageSource};

const DEFAULT_BASE_URL: &str = "https://vision.googleapis.com/";
const ANNOTATE_PATH: &str = "v1/images:annotate";

/// Client for the vision REST API.
///
/// Use [`VisionClient::new`] for production or [`VisionClient::with_base_url`]
/// to point at a mock server in tests.
pub struct VisionClient {
    client: Client,
    api_key: String,
    base_url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl std::fmt::Debug for VisionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisionClient")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"[redacted]")
            .field("max_retries", &self.max_retries)
            .field("backoff_base_ms", &self.backoff_base_ms)
            .finish_non_exhaustive()
    }
}

impl VisionClient {
    /// Creates a new client pointed at the production vision API.
    ///
    /// # Errors
    ///
    /// Returns [`VisionError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        api_key: &str,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, VisionError> {
        Self::with_base_url(
            api_key,
            timeout_secs,
            max_retries,
            backoff_base_ms,
            DEFAULT_BASE_URL,
        )
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`VisionError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`VisionError::InvalidBaseUrl`] if
    /// `base_url` is not a valid URL.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_ms: u64,
        base_url: &str,
    ) -> Result<Self, VisionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("shopaudit/0.1 (shelf-audit)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| VisionError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
            max_retries,
            backoff_base_ms,
        })
    }

    /// Runs object, label, text and logo detection on one image.
    ///
    /// # Errors
    ///
    /// - [`VisionError::Api`] if the API returns an error envelope.
    /// - [`VisionError::UnexpectedStatus`] for other non-2xx responses.
    /// - [`VisionError::Http`] on network failure.
    /// - [`VisionError::Deserialize`] if the response does not match the
    ///   expected shape.
    pub async fn annotate(&self, image: &ImageSource) -> Result<AnnotateResponse, VisionError> {
        let url = self.annotate_url()?;
        let request = AnnotateRequest::single(image);

        tracing::debug!(image = %image.describe(), "sending images:annotate request");
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.post_annotate(&url, &request)
        })
        .await
    }

    /// Builds the endpoint URL carrying the API key. Never log the result.
    pub(crate) fn annotate_url(&self) -> Result<Url, VisionError> {
        let mut url = self
            .base_url
            .join(ANNOTATE_PATH)
            .map_err(|e| VisionError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }

    async fn post_annotate(
        &self,
        url: &Url,
        request: &AnnotateRequest,
    ) -> Result<AnnotateResponse, VisionError> {
        let response = self
            .client
            .post(url.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| VisionError::Http(e.without_url()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| VisionError::Http(e.without_url()))?;

        if !status.is_success() {
            return Err(Self::status_error(status, &body));
        }

        let value: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| VisionError::Deserialize {
                context: ANNOTATE_PATH.to_string(),
                source: e,
            })?;
        if let Some(status) = Self::error_envelope(&value) {
            return Err(VisionError::Api {
                code: status.code,
                message: status.message,
            });
        }

        serde_json::from_value(value).map_err(|e| VisionError::Deserialize {
            context: ANNOTATE_PATH.to_string(),
            source: e,
        })
    }

    /// Maps a non-2xx response. Transient statuses stay retriable even when
    /// the body carries an error envelope.
    fn status_error(status: StatusCode, body: &str) -> VisionError {
        let code = status.as_u16();
        if is_retriable_status(code) {
            return VisionError::UnexpectedStatus { status: code };
        }
        serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .as_ref()
            .and_then(Self::error_envelope)
            .map_or(VisionError::UnexpectedStatus { status: code }, |s| {
                VisionError::Api {
                    code: s.code,
                    message: s.message,
                }
            })
    }

    /// Top-level `{"error": {"code", "message"}}` envelope, if present.
    fn error_envelope(body: &serde_json::Value) -> Option<Status> {
        let error = body.get("error").filter(|e| e.is_object())?;
        serde_json::from_value::<Status>(error.clone()).ok()
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
