//! Error types for catalog loading.

use thiserror::Error;

/// Errors that can occur while loading durations or building playlists.
///
/// Most of these never reach callers of [`crate::PlaylistBuilder`]: a failed
/// table load degrades to an empty table and a failed probe to a zero
/// duration. They surface from the lower-level fetch and probe calls.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Resource could not be reached (connection refused, timeout, missing file)
    #[error("Resource unreachable: {0}")]
    ResourceUnreachable(String),

    /// Server returned an error response
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Failed to parse a JSON document
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Invalid URL or audio reference
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Audio was fetched but its duration could not be read
    #[error("Decode or metadata failure: {0}")]
    DecodeOrMetadataFailure(String),

    /// IO error reading a local resource
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid key or unit
    #[error(transparent)]
    Core(#[from] tilawa_core::CoreError),
}

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;
