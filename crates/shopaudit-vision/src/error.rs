use thiserror::Error;

/// Errors returned by the vision API client.
#[derive(Debug, Error)]
pub enum VisionError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with an `{"error": {code, message}}` envelope.
    #[error("vision API error {code}: {message}")]
    Api { code: i32, message: String },

    /// Non-2xx response without a parseable error envelope.
    #[error("unexpected HTTP status {status}")]
    UnexpectedStatus { status: u16 },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
