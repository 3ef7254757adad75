/// Segment and source unit types
use crate::types::{SegmentKey, TextRef};
use serde::{Deserialize, Serialize};

/// One textual unit as handed over by a text source
///
/// This is the input to the playlist builder: ordered, with an optional audio
/// reference that has already been normalized to a full URL or path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceUnit {
    /// Stable segment key
    pub key: SegmentKey,

    /// Audio URL or path (None for text-only units)
    pub resource_ref: Option<String>,

    /// Handle back to the rendered unit
    pub text_ref: TextRef,
}

impl SourceUnit {
    /// Create a new source unit
    pub fn new(key: SegmentKey, resource_ref: Option<String>, text_ref: TextRef) -> Self {
        Self {
            key,
            resource_ref,
            text_ref,
        }
    }
}

/// One playable, highlightable unit
///
/// Segments are immutable once constructed. A duration of `0.0` means the
/// length is unknown, not that the segment is instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    key: SegmentKey,
    resource_ref: Option<String>,
    duration_seconds: f64,
    text_ref: TextRef,
}

impl Segment {
    /// Create a new segment
    ///
    /// Negative and non-finite durations are stored as `0.0` (unknown).
    /// An empty resource reference is treated as no resource.
    pub fn new(
        key: SegmentKey,
        resource_ref: Option<String>,
        duration_seconds: f64,
        text_ref: TextRef,
    ) -> Self {
        let duration_seconds = if duration_seconds.is_finite() && duration_seconds > 0.0 {
            duration_seconds
        } else {
            0.0
        };

        Self {
            key,
            resource_ref: resource_ref.filter(|r| !r.trim().is_empty()),
            duration_seconds,
            text_ref,
        }
    }

    /// Build a segment from a source unit and a resolved duration
    pub fn from_unit(unit: SourceUnit, duration_seconds: f64) -> Self {
        Self::new(unit.key, unit.resource_ref, duration_seconds, unit.text_ref)
    }

    /// Segment key
    pub fn key(&self) -> &SegmentKey {
        &self.key
    }

    /// Audio reference, if any
    pub fn resource_ref(&self) -> Option<&str> {
        self.resource_ref.as_deref()
    }

    /// Duration in seconds (`0.0` = unknown)
    pub fn duration_seconds(&self) -> f64 {
        self.duration_seconds
    }

    /// Handle of the on-screen unit
    pub fn text_ref(&self) -> &TextRef {
        &self.text_ref
    }

    /// Whether the sequencer may hand this segment to the audio output
    pub fn is_playable(&self) -> bool {
        self.resource_ref.is_some()
    }
}
