//! Error types for the extraction layer.

use thiserror::Error;

/// Errors that can occur while extracting perks from a screenshot.
///
/// The variants are deliberately distinct so callers can tell bad input
/// (`ImageNotFound`) from bad extraction (`MalformedResponse`) from
/// transport trouble (`Request`).
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The input image path does not resolve to a file.
    #[error("image not found: {0}")]
    ImageNotFound(String),

    /// The model endpoint could not be reached or returned a failure.
    #[error("extractor request failed: {0}")]
    Request(String),

    /// The model response does not conform to the expected batch schema.
    #[error("malformed extractor response: {0}")]
    MalformedResponse(String),
}

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractError>;
