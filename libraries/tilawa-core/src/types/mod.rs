mod ids;
mod playlist;
mod segment;

pub use ids::{ProgramId, SegmentKey, TextRef};
pub use playlist::Playlist;
pub use segment::{Segment, SourceUnit};
