//! Error types for playback sequencing

use thiserror::Error;

/// Playback errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlaybackError {
    /// No program has been loaded into the sequencer
    #[error("No program loaded")]
    NoProgramLoaded,

    /// Audio could not be fetched
    #[error("Resource unreachable: {0}")]
    ResourceUnreachable(String),

    /// Segment has no audio, or the platform refused to play it
    #[error("Segment {key} unplayable: {reason}")]
    SegmentUnplayable { key: String, reason: String },

    /// Audio was fetched but could not be decoded
    #[error("Decode or metadata failure: {0}")]
    DecodeOrMetadataFailure(String),

    /// Seek target is not a finite number of seconds
    #[error("Invalid seek position: {0}")]
    InvalidSeekPosition(f64),

    /// Index out of bounds
    #[error("Index out of bounds: {0}")]
    IndexOutOfBounds(usize),

    /// Invalid operation
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
