//! Playable resource abstraction
//!
//! Abstracts the single audio output the sequencer drives (an HTML audio
//! element, a desktop output stream, a test double).

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Identity of one playback-start request
///
/// Every signal a resource reports back carries the ticket it was started
/// with. The sequencer applies a signal only while the ticket is still the
/// current binding, so completions from a previous program or a superseded
/// segment are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlaybackTicket {
    /// Program generation (bumped by load and stop)
    pub generation: u64,

    /// Start request number within the sequencer's lifetime
    pub serial: u64,

    /// Playlist index the request was made for
    pub index: usize,
}

/// Signals reported by a playable resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ResourceEvent {
    /// Segment played to the end
    Finished { ticket: PlaybackTicket },

    /// Loading or playback failed after the start request was accepted
    Failed {
        ticket: PlaybackTicket,
        reason: String,
    },

    /// Periodic position report, seconds into the segment
    TimeUpdate { ticket: PlaybackTicket, elapsed: f64 },
}

impl ResourceEvent {
    /// Ticket the signal belongs to
    pub fn ticket(&self) -> PlaybackTicket {
        match self {
            Self::Finished { ticket }
            | Self::Failed { ticket, .. }
            | Self::TimeUpdate { ticket, .. } => *ticket,
        }
    }
}

/// Platform audio output owned by the sequencer
///
/// Only the sequencer may call these. Outcomes that arrive later are fed back
/// through `Sequencer::handle_event` tagged with the ticket given to `start`.
pub trait PlayableResource {
    /// Assign `source` and request playback from `offset` seconds
    ///
    /// Replaces whatever was assigned before. An `Err` means the platform
    /// rejected the request synchronously.
    fn start(&mut self, ticket: PlaybackTicket, source: &str, offset: f64) -> Result<()>;

    /// Pause in place
    fn pause(&mut self);

    /// Resume after `pause`
    fn resume(&mut self) -> Result<()>;

    /// Cancel any pending request, stop output and forget the current ticket
    fn detach(&mut self);
}

/// Resource that accepts every request and never reports back
///
/// Useful for driving the sequencer by hand (text-only reading, tests).
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentResource;

impl PlayableResource for SilentResource {
    fn start(&mut self, _ticket: PlaybackTicket, _source: &str, _offset: f64) -> Result<()> {
        Ok(())
    }

    fn pause(&mut self) {}

    fn resume(&mut self) -> Result<()> {
        Ok(())
    }

    fn detach(&mut self) {}
}
