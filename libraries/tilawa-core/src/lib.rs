//! Tilawa Core
//!
//! Domain types and error handling shared by the playback and catalog crates.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Identifiers**: `ProgramId`, `SegmentKey`, `TextRef`
//! - **Program content**: `SourceUnit` (what a text source hands over),
//!   `Segment` and `Playlist` (what the sequencer plays)
//! - **Error Handling**: `CoreError` and `Result`
//!
//! # Example
//!
//! ```rust
//! use tilawa_core::{Playlist, ProgramId, Segment, SegmentKey, TextRef};
//!
//! let playlist = Playlist::new(
//!     ProgramId::new("1"),
//!     vec![
//!         Segment::new(
//!             SegmentKey::verse(1, 1),
//!             Some("Alafasy/mp3/001001.mp3".to_string()),
//!             6.5,
//!             TextRef::new("verse-1"),
//!         ),
//!         Segment::new(SegmentKey::verse(1, 2), None, 0.0, TextRef::new("verse-2")),
//!     ],
//! );
//!
//! assert_eq!(playlist.len(), 2);
//! assert_eq!(playlist.total_duration(), 6.5);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod types;

pub use error::{CoreError, Result};
pub use types::{Playlist, ProgramId, Segment, SegmentKey, SourceUnit, TextRef};
