//! Playback position tracking
//!
//! Maps between "segment index + seconds into it" and "seconds since the
//! start of the program". Segment start times are accumulated in index
//! order, so `locate` and `cumulative_elapsed` agree on every boundary.

use crate::types::PlaybackState;
use serde::{Deserialize, Serialize};
use tilawa_core::Playlist;

/// A position expressed as a segment and an offset into it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Segment index
    pub index: usize,

    /// Seconds into the segment
    pub offset: f64,
}

/// Program-wide progress, as shown by the progress bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    /// Seconds since the start of the program
    pub elapsed: f64,

    /// Program length in seconds
    pub total: f64,

    /// `elapsed / total` in `[0, 1]`; 0 when the total is unknown
    pub fraction: f64,
}

impl Progress {
    /// Progress for a playback state within a playlist
    pub fn of(playlist: &Playlist, state: &PlaybackState) -> Self {
        let elapsed = cumulative_elapsed(playlist, state.active_index, state.elapsed_in_segment);

        Self {
            elapsed,
            total: playlist.total_duration(),
            fraction: fraction_of(elapsed, playlist.total_duration()),
        }
    }

    /// Progress before anything is loaded
    pub fn zero() -> Self {
        Self {
            elapsed: 0.0,
            total: 0.0,
            fraction: 0.0,
        }
    }
}

/// Seconds since the start of the program
///
/// Sum of durations of segments before `active_index`, plus the time into the
/// active segment capped at its known duration. A segment of unknown length
/// (`0.0`) contributes nothing, so progress never runs ahead of where the
/// next segment starts.
pub fn cumulative_elapsed(playlist: &Playlist, active_index: usize, elapsed_in_segment: f64) -> f64 {
    let completed: f64 = playlist
        .iter()
        .take(active_index)
        .map(|s| s.duration_seconds())
        .sum();

    let into_active = match playlist.get(active_index) {
        Some(segment) => sanitize(elapsed_in_segment).min(segment.duration_seconds()),
        None => 0.0,
    };

    completed + into_active
}

/// Overall progress in `[0, 1]`
pub fn progress_fraction(playlist: &Playlist, active_index: usize, elapsed_in_segment: f64) -> f64 {
    fraction_of(
        cumulative_elapsed(playlist, active_index, elapsed_in_segment),
        playlist.total_duration(),
    )
}

/// Find the segment containing `target_elapsed`
///
/// Returns the first segment whose cumulative end exceeds the target. Targets
/// at or past the end clamp to the last segment at its full duration. Negative
/// or non-finite targets are treated as 0; an empty playlist yields `(0, 0)`.
///
/// A segment boundary belongs to the following segment: the end of segment
/// `i` (`(i, duration_i)`) and the start of `i + 1` (`(i + 1, 0)`) are the
/// same program position and locate to the latter. Only the last segment is
/// ever located at its full duration.
pub fn locate(playlist: &Playlist, target_elapsed: f64) -> Location {
    let target = sanitize(target_elapsed);

    let mut start = 0.0;
    for (index, segment) in playlist.iter().enumerate() {
        let end = start + segment.duration_seconds();
        if end > target {
            return Location {
                index,
                offset: (target - start).max(0.0),
            };
        }
        start = end;
    }

    match playlist.len().checked_sub(1) {
        Some(last) => Location {
            index: last,
            offset: playlist
                .get(last)
                .map(|s| s.duration_seconds())
                .unwrap_or(0.0),
        },
        None => Location {
            index: 0,
            offset: 0.0,
        },
    }
}

/// Format seconds as `m:ss`
///
/// Minutes are not wrapped into hours (`75:03`), matching the reader's clock.
pub fn format_clock(seconds: f64) -> String {
    let seconds = sanitize(seconds);
    let minutes = (seconds / 60.0).floor() as u64;
    let remaining = (seconds % 60.0).floor() as u64;
    format!("{minutes}:{remaining:02}")
}

fn fraction_of(elapsed: f64, total: f64) -> f64 {
    if total > 0.0 {
        (elapsed / total).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn sanitize(seconds: f64) -> f64 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    }
}
