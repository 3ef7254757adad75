/// Playlist domain type
use crate::types::{ProgramId, Segment};
use serde::Serialize;

/// Ordered segments for one loaded program
///
/// Order matches display order. The playlist is immutable: a new program
/// means a new playlist, never an in-place edit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Playlist {
    program_id: ProgramId,
    segments: Vec<Segment>,
    total_duration: f64,
}

impl Playlist {
    /// Create a playlist from segments in display order
    pub fn new(program_id: ProgramId, segments: Vec<Segment>) -> Self {
        let total_duration = segments.iter().map(Segment::duration_seconds).sum();

        Self {
            program_id,
            segments,
            total_duration,
        }
    }

    /// Create an empty playlist for a program
    pub fn empty(program_id: ProgramId) -> Self {
        Self::new(program_id, Vec::new())
    }

    /// Program this playlist belongs to
    pub fn program_id(&self) -> &ProgramId {
        &self.program_id
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether the playlist has no segments
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Segment at `index`, if valid
    pub fn get(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    /// All segments in order
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Iterate segments in order
    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.segments.iter()
    }

    /// Sum of all segment durations, in seconds
    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    /// Index of the first playable segment at or after `from`
    pub fn next_playable(&self, from: usize) -> Option<usize> {
        self.segments
            .iter()
            .enumerate()
            .skip(from)
            .find(|(_, s)| s.is_playable())
            .map(|(i, _)| i)
    }

    /// Number of segments with an audio resource
    pub fn playable_count(&self) -> usize {
        self.segments.iter().filter(|s| s.is_playable()).count()
    }
}

impl<'a> IntoIterator for &'a Playlist {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}
