//! Playback Events
//!
//! Event-based communication for UI glue that prefers polling over callbacks.
//! Events are queued at key points and collected with `drain_events()`:
//! - Program loads
//! - State changes (idle/playing/paused/ended)
//! - Segment changes (highlight moves) and skips
//! - Position updates

use crate::types::SequencerState;
use serde::{Deserialize, Serialize};

/// Events emitted by the sequencer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// A new playlist replaced the previous one
    ProgramLoaded {
        /// Program identifier
        program_id: String,
        /// Number of segments
        segments: usize,
        /// Total duration in seconds
        total_seconds: f64,
    },

    /// Sequencer state changed
    StateChanged {
        /// The new state
        state: PlaybackStateEvent,
    },

    /// Active segment changed (highlight moved)
    SegmentChanged {
        /// New active index
        index: usize,
        /// Key of the new segment
        key: String,
        /// Previously highlighted index, if any
        previous_index: Option<usize>,
    },

    /// Segment was passed over without playing
    SegmentSkipped {
        /// Skipped index
        index: usize,
        /// Key of the skipped segment
        key: String,
        /// Why it was skipped
        reason: SkipReason,
    },

    /// Segment played to its end
    SegmentFinished {
        /// Finished index
        index: usize,
        /// Key of the finished segment
        key: String,
    },

    /// Position changed (transition, tick or seek)
    PositionUpdate {
        /// Seconds since the start of the program
        elapsed_seconds: f64,
        /// Program length in seconds
        total_seconds: f64,
        /// `elapsed / total`, 0 when the total is unknown
        fraction: f64,
    },

    /// Highlight removed
    HighlightCleared,

    /// Playlist exhausted
    Ended {
        /// Program identifier
        program_id: String,
    },

    /// A UI callback failed (playback continued)
    Error {
        /// Error message
        message: String,
    },
}

/// Why a segment was skipped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// Segment has no audio resource
    NoResource,

    /// Audio failed to load or the platform rejected playback
    Failed(String),
}

/// Sequencer state for events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackStateEvent {
    /// Nothing playing, position at the start
    Idle,
    /// Playing audio
    Playing,
    /// Paused mid-segment
    Paused,
    /// Playlist finished
    Ended,
}

impl From<SequencerState> for PlaybackStateEvent {
    fn from(state: SequencerState) -> Self {
        match state {
            SequencerState::Idle => PlaybackStateEvent::Idle,
            SequencerState::Playing(_) => PlaybackStateEvent::Playing,
            SequencerState::Paused(_) => PlaybackStateEvent::Paused,
            SequencerState::Ended => PlaybackStateEvent::Ended,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playback_state_event_conversion() {
        assert_eq!(
            PlaybackStateEvent::from(SequencerState::Playing(4)),
            PlaybackStateEvent::Playing
        );
        assert_eq!(
            PlaybackStateEvent::from(SequencerState::Paused(0)),
            PlaybackStateEvent::Paused
        );
        assert_eq!(
            PlaybackStateEvent::from(SequencerState::Idle),
            PlaybackStateEvent::Idle
        );
        assert_eq!(
            PlaybackStateEvent::from(SequencerState::Ended),
            PlaybackStateEvent::Ended
        );
    }

    #[test]
    fn events_serialize_for_ui_bridges() {
        let event = PlaybackEvent::SegmentSkipped {
            index: 1,
            key: "1:2".into(),
            reason: SkipReason::NoResource,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("SegmentSkipped"));
        let back: PlaybackEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
