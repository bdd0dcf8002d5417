//! Async client for the vision `images:annotate` API.
//!
//! [`VisionClient::annotate`] returns the raw annotation envelope;
//! [`VisionClient::analyze`] feeds it through the brand detection summarizer.

mod analyze;
pub mod client;
pub mod error;
pub(crate) mod retry;
pub mod types;

pub use client::VisionClient;
pub use error::VisionError;
pub use types::{ImageSource, FEATURES};
