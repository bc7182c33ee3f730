// src/error.rs
use thiserror::Error;

/// Everything that can go wrong in one submit/export cycle. Display text is
/// what the user sees; richer detail goes to the tracing log at the failure
/// site. String payloads keep the type `Clone` so it can travel inside
/// application messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    /// The text input is not valid JSON. Caught before any network call.
    #[error("Invalid JSON format. Please enter valid JSON data.")]
    InvalidInputFormat,

    /// File mode was submitted with no file selected.
    #[error("Please upload a file")]
    MissingInput,

    /// The request failed or the service answered with a non-success status.
    #[error("{0}")]
    Transport(String),

    /// The response body was unparsable or missing `pseudonymized_data`.
    #[error("Error processing data: Invalid response format.")]
    ResponseFormat,
}
