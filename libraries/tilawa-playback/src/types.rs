//! Core types for playback sequencing

use serde::{Deserialize, Serialize};

/// Sequencer state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SequencerState {
    /// No program loaded, or stopped
    Idle,

    /// Segment at this index is playing
    Playing(usize),

    /// Paused at this index, resumable
    Paused(usize),

    /// Ran past the last segment
    Ended,
}

impl SequencerState {
    /// Index the state refers to, if any
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::Playing(index) | Self::Paused(index) => Some(*index),
            Self::Idle | Self::Ended => None,
        }
    }

    /// Whether audio is (supposed to be) audible
    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing(_))
    }
}

/// Position of the sequencer within the loaded playlist
///
/// Only the sequencer writes this. `is_playing == false` with a retained
/// `active_index` means paused; it is zeroed on stop and at the end of the
/// playlist.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlaybackState {
    /// Index of the active segment
    pub active_index: usize,

    /// Whether the active segment is playing
    pub is_playing: bool,

    /// Seconds into the active segment
    pub elapsed_in_segment: f64,
}

/// What happens when a segment finishes on its own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdvanceMode {
    /// Continue with the next playable segment (play-all)
    #[default]
    Continuous,

    /// Pause on the next segment after each one (single verse playback)
    Single,
}

/// Configuration for the sequencer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Behaviour at the end of a segment (default: Continuous)
    pub advance_mode: AdvanceMode,

    /// `previous()` restarts the current segment when further in than this
    /// (default: 3.0 seconds)
    pub previous_restart_threshold_secs: f64,

    /// Clamp reported segment time to the segment's known duration
    /// (default: true)
    pub clamp_tick_to_duration: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            advance_mode: AdvanceMode::Continuous,
            previous_restart_threshold_secs: 3.0,
            clamp_tick_to_duration: true,
        }
    }
}
