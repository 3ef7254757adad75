//! Tilawa Playback - verse/hadith playback sequencing
//!
//! Platform-agnostic sequencing of per-segment recitation audio with the
//! text being read along.
//!
//! # Features
//!
//! - **Sequencing**: gapless advance through a playlist, one segment at a time
//! - **Skip handling**: segments without audio or with failing audio are passed over
//! - **Seeking**: program-wide seconds or progress-bar fractions
//! - **Highlight sync**: callbacks (or polled events) for the active unit and progress
//! - **Stale signals**: late completions from a previous program are discarded
//!
//! # Architecture
//!
//! This crate knows nothing about audio decoding or UI toolkits. The platform
//! supplies a [`PlayableResource`] to play sources and a [`SyncObserver`] to
//! highlight text; it forwards whatever the resource reports back through
//! [`Sequencer::handle_event`].
//!
//! # Example
//!
//! ```rust
//! use tilawa_core::{Playlist, ProgramId, Segment, SegmentKey, TextRef};
//! use tilawa_playback::{PlaybackConfig, Sequencer, SequencerState, SilentResource};
//!
//! let playlist = Playlist::new(
//!     ProgramId::surah(112),
//!     vec![
//!         Segment::new(SegmentKey::verse(112, 1), Some("112001.mp3".into()), 3.0, TextRef::new("verse-1")),
//!         Segment::new(SegmentKey::verse(112, 2), Some("112002.mp3".into()), 2.5, TextRef::new("verse-2")),
//!     ],
//! );
//!
//! let mut sequencer = Sequencer::new(PlaybackConfig::default(), Box::new(SilentResource));
//! sequencer.load(playlist);
//! sequencer.seek(4.0)?;
//! sequencer.play()?;
//!
//! assert_eq!(sequencer.state(), SequencerState::Playing(1));
//! # Ok::<(), tilawa_playback::PlaybackError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod error;
pub mod events;
mod observer;
pub mod position;
mod resource;
mod sequencer;
mod types;

pub use error::{PlaybackError, Result};
pub use events::{PlaybackEvent, PlaybackStateEvent, SkipReason};
pub use observer::{ObserverError, ObserverResult, SyncObserver};
pub use position::{cumulative_elapsed, format_clock, locate, progress_fraction, Location, Progress};
pub use resource::{PlayableResource, PlaybackTicket, ResourceEvent, SilentResource};
pub use sequencer::Sequencer;
pub use types::{AdvanceMode, PlaybackConfig, PlaybackState, SequencerState};
