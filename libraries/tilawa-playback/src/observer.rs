//! UI callbacks driven by the sequencer

use crate::position::Progress;
use thiserror::Error;
use tilawa_core::TextRef;

/// Failure reported by a UI callback
///
/// The sequencer logs these and carries on; they never change playback state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ObserverError(pub String);

impl ObserverError {
    /// Create an observer error
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Result type for observer callbacks
pub type ObserverResult = std::result::Result<(), ObserverError>;

/// Highlight/scroll and progress display hooks
///
/// Calls for segment `N` always complete before any call for segment `N + 1`
/// is made. Calling the hooks again with the same arguments must produce the
/// same screen (`Sequencer::resync` relies on it).
pub trait SyncObserver {
    /// Highlight the unit at `index` and scroll it into view
    fn on_highlight(&mut self, index: usize, text_ref: &TextRef) -> ObserverResult;

    /// Remove any highlight (stop, end of playlist, new program)
    fn on_highlight_cleared(&mut self) -> ObserverResult {
        Ok(())
    }

    /// Update the progress display
    fn on_progress(&mut self, progress: Progress) -> ObserverResult;
}
