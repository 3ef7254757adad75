//! Sequencer - core orchestration
//!
//! Owns the loaded playlist, the playback position and the audio output, and
//! turns user commands and resource signals into state transitions.

use crate::{
    error::{PlaybackError, Result},
    events::{PlaybackEvent, PlaybackStateEvent, SkipReason},
    observer::SyncObserver,
    position::{self, Location, Progress},
    resource::{PlayableResource, PlaybackTicket, ResourceEvent},
    types::{AdvanceMode, PlaybackConfig, PlaybackState, SequencerState},
};
use tilawa_core::{Playlist, Segment};
use tracing::{debug, info, warn};

/// Audio/text synchronization state machine
///
/// Orchestrates:
/// - Segment sequencing (start, gapless advance, pause/resume, seek, stop)
/// - Skipping segments without audio and recovering from failed ones
/// - Highlight and progress side effects on every position change
/// - Discarding late signals from superseded programs or segments
///
/// All transitions run to completion before returning, so side effects for
/// one segment are always issued before those of the next.
pub struct Sequencer {
    config: PlaybackConfig,

    // Output and UI hooks
    resource: Box<dyn PlayableResource>,
    observer: Option<Box<dyn SyncObserver>>,

    // Program and position
    playlist: Option<Playlist>,
    playback: PlaybackState,
    state: SequencerState,

    // Stale-signal protection
    generation: u64,
    serial: u64,
    binding: Option<PlaybackTicket>,

    // Index the UI currently shows as highlighted
    highlighted: Option<usize>,

    // Event queue for UI synchronization
    pending_events: Vec<PlaybackEvent>,
}

impl Sequencer {
    /// Create a sequencer driving `resource`
    pub fn new(config: PlaybackConfig, resource: Box<dyn PlayableResource>) -> Self {
        Self {
            config,
            resource,
            observer: None,
            playlist: None,
            playback: PlaybackState::default(),
            state: SequencerState::Idle,
            generation: 0,
            serial: 0,
            binding: None,
            highlighted: None,
            pending_events: Vec::new(),
        }
    }

    /// Attach the highlight/progress hooks
    pub fn with_observer(mut self, observer: Box<dyn SyncObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Replace the highlight/progress hooks
    pub fn set_observer(&mut self, observer: Box<dyn SyncObserver>) {
        self.observer = Some(observer);
    }

    // ===== Program =====

    /// Load a new program
    ///
    /// Cancels whatever the previous program was doing; signals still in
    /// flight for it are ignored from here on.
    pub fn load(&mut self, playlist: Playlist) {
        self.release_binding();
        self.generation += 1;

        info!(
            program = %playlist.program_id(),
            segments = playlist.len(),
            playable = playlist.playable_count(),
            total_seconds = playlist.total_duration(),
            generation = self.generation,
            "Program loaded"
        );

        self.emit(PlaybackEvent::ProgramLoaded {
            program_id: playlist.program_id().to_string(),
            segments: playlist.len(),
            total_seconds: playlist.total_duration(),
        });

        self.playlist = Some(playlist);
        self.playback = PlaybackState::default();
        self.set_state(SequencerState::Idle);
        self.clear_highlight();
        self.publish_progress();
    }

    // ===== Playback Control =====

    /// Start or resume playback
    ///
    /// From `Idle` this starts at the stored position (the beginning unless a
    /// seek moved it), from `Paused` it resumes, from `Ended` it starts over.
    pub fn play(&mut self) -> Result<()> {
        self.require_playlist()?;

        match self.state {
            SequencerState::Playing(_) => Ok(()),
            SequencerState::Paused(index) => {
                if self.binding.is_some() {
                    match self.resource.resume() {
                        Ok(()) => {
                            self.playback.is_playing = true;
                            self.set_state(SequencerState::Playing(index));
                        }
                        Err(err) => {
                            self.skip_failed(index, err.to_string());
                            self.start_from(index + 1, 0.0);
                        }
                    }
                } else {
                    self.start_from(index, self.playback.elapsed_in_segment);
                }
                Ok(())
            }
            SequencerState::Idle => {
                self.start_from(self.playback.active_index, self.playback.elapsed_in_segment);
                Ok(())
            }
            SequencerState::Ended => {
                self.start_from(0, 0.0);
                Ok(())
            }
        }
    }

    /// Start playback at a given segment
    pub fn play_from(&mut self, index: usize) -> Result<()> {
        let len = self.require_playlist()?.len();
        if index >= len {
            return Err(PlaybackError::IndexOutOfBounds(index));
        }

        self.start_from(index, 0.0);
        Ok(())
    }

    /// Pause playback, keeping the position
    pub fn pause(&mut self) {
        if let SequencerState::Playing(index) = self.state {
            self.resource.pause();
            self.playback.is_playing = false;
            self.set_state(SequencerState::Paused(index));
        }
    }

    /// Stop playback and rewind to the first segment
    pub fn stop(&mut self) {
        self.release_binding();
        self.generation += 1;
        self.playback = PlaybackState::default();
        self.set_state(SequencerState::Idle);
        self.clear_highlight();
        self.publish_progress();
    }

    /// Move to the next segment and play it
    ///
    /// This is the gapless path taken when a segment finishes. Past the last
    /// segment the sequencer ends and rewinds; once `Ended`, only `play()`
    /// starts it again.
    pub fn advance(&mut self) -> Result<()> {
        let len = self.require_playlist()?.len();

        if self.state == SequencerState::Ended {
            debug!("Advance ignored, playlist already ended");
            return Ok(());
        }

        let next = self.playback.active_index + 1;
        if next >= len {
            self.finish();
        } else {
            self.start_from(next, 0.0);
        }
        Ok(())
    }

    /// Skip to the following segment, keeping the play/pause status
    ///
    /// No-op on the last segment.
    pub fn next(&mut self) -> Result<()> {
        let len = self.require_playlist()?.len();
        let target = self.playback.active_index + 1;
        if target >= len {
            return Ok(());
        }

        if self.state.is_playing() {
            self.start_from(target, 0.0);
        } else {
            self.move_to(target, 0.0);
        }
        Ok(())
    }

    /// Go back one segment
    ///
    /// Further into the current segment than the configured threshold, this
    /// restarts it instead. While playing, segments without audio are passed
    /// over going backwards too.
    pub fn previous(&mut self) -> Result<()> {
        let playlist = self.require_playlist()?;
        let current = self.playback.active_index;

        let restart = self.playback.elapsed_in_segment > self.config.previous_restart_threshold_secs;
        let playing = self.state.is_playing();

        let target = if restart {
            current
        } else if playing {
            (0..current)
                .rev()
                .find(|i| playlist.get(*i).is_some_and(Segment::is_playable))
                .unwrap_or(current)
        } else {
            current.saturating_sub(1)
        };

        if playing {
            self.start_from(target, 0.0);
        } else {
            self.move_to(target, 0.0);
        }
        Ok(())
    }

    // ===== Seek =====

    /// Seek to a program-wide position in seconds
    ///
    /// While playing, the located segment is started at the offset. Otherwise
    /// the position is only stored and used by the next `play()`.
    pub fn seek(&mut self, target_elapsed: f64) -> Result<Location> {
        if !target_elapsed.is_finite() {
            return Err(PlaybackError::InvalidSeekPosition(target_elapsed));
        }
        let location = position::locate(self.require_playlist()?, target_elapsed);

        debug!(
            target = target_elapsed,
            index = location.index,
            offset = location.offset,
            "Seek"
        );

        if self.state.is_playing() {
            self.start_from(location.index, location.offset);
        } else {
            self.move_to(location.index, location.offset);
        }
        Ok(location)
    }

    /// Seek to a fraction of the program (progress bar click)
    pub fn seek_fraction(&mut self, fraction: f64) -> Result<Location> {
        let total = self.require_playlist()?.total_duration();
        let fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.seek(fraction * total)
    }

    // ===== Resource Signals =====

    /// Apply a signal reported by the playable resource
    ///
    /// Returns `false` when the signal belongs to a superseded start request
    /// (an earlier segment or program) and was discarded.
    pub fn handle_event(&mut self, event: ResourceEvent) -> bool {
        let ticket = event.ticket();
        if self.binding != Some(ticket) {
            debug!(
                generation = ticket.generation,
                serial = ticket.serial,
                index = ticket.index,
                current_generation = self.generation,
                "Ignoring stale resource signal"
            );
            return false;
        }

        match event {
            ResourceEvent::Finished { .. } => self.segment_finished(ticket.index),
            ResourceEvent::Failed { reason, .. } => {
                self.skip_failed(ticket.index, reason);
                if self.state.is_playing() {
                    self.start_from(ticket.index + 1, 0.0);
                } else {
                    self.release_binding();
                }
            }
            ResourceEvent::TimeUpdate { elapsed, .. } => self.tick(ticket.index, elapsed),
        }

        true
    }

    // ===== State Queries =====

    /// Current state machine state
    pub fn state(&self) -> SequencerState {
        self.state
    }

    /// Current playback position
    pub fn playback_state(&self) -> PlaybackState {
        self.playback
    }

    /// Loaded playlist
    pub fn playlist(&self) -> Option<&Playlist> {
        self.playlist.as_ref()
    }

    /// Active segment
    pub fn current_segment(&self) -> Option<&Segment> {
        self.playlist
            .as_ref()
            .and_then(|p| p.get(self.playback.active_index))
    }

    /// Program-wide progress
    pub fn progress(&self) -> Progress {
        self.playlist
            .as_ref()
            .map(|p| Progress::of(p, &self.playback))
            .unwrap_or_else(Progress::zero)
    }

    /// Generation of the loaded program (changes on load and stop)
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Ticket of the outstanding start request, if any
    pub fn current_ticket(&self) -> Option<PlaybackTicket> {
        self.binding
    }

    /// Configuration in use
    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    /// Re-issue highlight and progress derived from the current position
    ///
    /// Used after the UI re-rendered; produces the same calls as the last
    /// transition did.
    pub fn resync(&mut self) {
        match self.highlighted {
            Some(index) => self.notify_highlight(index),
            None => self.notify_highlight_cleared(),
        }
        self.publish_progress();
    }

    // ===== Events =====

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Whether events are waiting to be drained
    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    // ===== Internals =====

    fn require_playlist(&self) -> Result<&Playlist> {
        self.playlist.as_ref().ok_or(PlaybackError::NoProgramLoaded)
    }

    /// Start the first playable segment at or after `index`
    ///
    /// Segments without audio and segments the resource rejects are skipped
    /// in this same call. Running off the end finishes the playlist.
    fn start_from(&mut self, mut index: usize, mut offset: f64) {
        loop {
            let Some(segment) = self
                .playlist
                .as_ref()
                .and_then(|p| p.get(index))
                .cloned()
            else {
                break;
            };

            let Some(source) = segment.resource_ref() else {
                debug!(index, key = %segment.key(), "Skipping segment without audio");
                self.emit(PlaybackEvent::SegmentSkipped {
                    index,
                    key: segment.key().to_string(),
                    reason: SkipReason::NoResource,
                });
                index += 1;
                offset = 0.0;
                continue;
            };

            self.serial += 1;
            let ticket = PlaybackTicket {
                generation: self.generation,
                serial: self.serial,
                index,
            };
            self.binding = Some(ticket);

            match self.resource.start(ticket, source, offset) {
                Ok(()) => {
                    self.playback = PlaybackState {
                        active_index: index,
                        is_playing: true,
                        elapsed_in_segment: offset,
                    };
                    self.set_state(SequencerState::Playing(index));
                    self.enter_index(index);
                    self.publish_progress();
                    return;
                }
                Err(err) => {
                    self.binding = None;
                    self.skip_failed(index, err.to_string());
                    index += 1;
                    offset = 0.0;
                }
            }
        }

        self.finish();
    }

    /// Store a position without playing
    fn move_to(&mut self, index: usize, offset: f64) {
        self.release_binding();
        self.playback = PlaybackState {
            active_index: index,
            is_playing: false,
            elapsed_in_segment: offset,
        };

        let state = match self.state {
            SequencerState::Paused(_) | SequencerState::Playing(_) => SequencerState::Paused(index),
            SequencerState::Idle | SequencerState::Ended => SequencerState::Idle,
        };
        self.set_state(state);
        self.enter_index(index);
        self.publish_progress();
    }

    fn segment_finished(&mut self, index: usize) {
        if let Some(key) = self.key_at(index) {
            self.emit(PlaybackEvent::SegmentFinished { index, key });
        }

        match (self.config.advance_mode, self.state) {
            (AdvanceMode::Continuous, SequencerState::Playing(_)) => {
                self.start_from(index + 1, 0.0);
            }
            _ => {
                let next = self
                    .playlist
                    .as_ref()
                    .and_then(|p| p.next_playable(index + 1));
                match next {
                    Some(next) => self.move_to(next, 0.0),
                    None => self.finish(),
                }
            }
        }
    }

    fn tick(&mut self, index: usize, elapsed: f64) {
        if index != self.playback.active_index || self.state.index().is_none() {
            return;
        }

        let mut elapsed = if elapsed.is_finite() { elapsed.max(0.0) } else { 0.0 };
        if self.config.clamp_tick_to_duration {
            let duration = self
                .current_segment()
                .map(Segment::duration_seconds)
                .unwrap_or(0.0);
            if duration > 0.0 {
                elapsed = elapsed.min(duration);
            }
        }

        self.playback.elapsed_in_segment = elapsed;
        self.publish_progress();
    }

    fn skip_failed(&mut self, index: usize, reason: String) {
        let key = self.key_at(index).unwrap_or_default();
        warn!(index, key = %key, reason = %reason, "Segment unplayable, skipping");
        self.emit(PlaybackEvent::SegmentSkipped {
            index,
            key,
            reason: SkipReason::Failed(reason),
        });
    }

    fn finish(&mut self) {
        self.release_binding();
        self.playback = PlaybackState::default();
        self.set_state(SequencerState::Ended);
        self.clear_highlight();

        let program_id = self
            .playlist
            .as_ref()
            .map(|p| p.program_id().to_string())
            .unwrap_or_default();
        info!(program = %program_id, "Playlist ended");
        self.emit(PlaybackEvent::Ended { program_id });
        self.publish_progress();
    }

    fn release_binding(&mut self) {
        self.binding = None;
        self.resource.detach();
    }

    fn set_state(&mut self, state: SequencerState) {
        let changed = PlaybackStateEvent::from(self.state) != PlaybackStateEvent::from(state);
        self.state = state;
        if changed {
            self.emit(PlaybackEvent::StateChanged {
                state: state.into(),
            });
        }
    }

    fn key_at(&self, index: usize) -> Option<String> {
        self.playlist
            .as_ref()
            .and_then(|p| p.get(index))
            .map(|s| s.key().to_string())
    }

    /// Move the highlight if the index changed
    fn enter_index(&mut self, index: usize) {
        if self.highlighted == Some(index) {
            return;
        }

        let previous_index = self.highlighted.replace(index);
        if let Some(key) = self.key_at(index) {
            self.emit(PlaybackEvent::SegmentChanged {
                index,
                key,
                previous_index,
            });
        }
        self.notify_highlight(index);
    }

    fn clear_highlight(&mut self) {
        if self.highlighted.take().is_some() {
            self.emit(PlaybackEvent::HighlightCleared);
            self.notify_highlight_cleared();
        }
    }

    fn notify_highlight(&mut self, index: usize) {
        let Some(text_ref) = self
            .playlist
            .as_ref()
            .and_then(|p| p.get(index))
            .map(|s| s.text_ref().clone())
        else {
            return;
        };

        let outcome = match self.observer.as_mut() {
            Some(observer) => observer.on_highlight(index, &text_ref),
            None => Ok(()),
        };
        if let Err(err) = outcome {
            warn!(index, text_ref = %text_ref, error = %err, "Highlight callback failed");
            self.emit_error(format!("highlight failed: {err}"));
        }
    }

    fn notify_highlight_cleared(&mut self) {
        let outcome = match self.observer.as_mut() {
            Some(observer) => observer.on_highlight_cleared(),
            None => Ok(()),
        };
        if let Err(err) = outcome {
            warn!(error = %err, "Highlight clear callback failed");
            self.emit_error(format!("highlight clear failed: {err}"));
        }
    }

    fn publish_progress(&mut self) {
        let progress = self.progress();
        self.emit(PlaybackEvent::PositionUpdate {
            elapsed_seconds: progress.elapsed,
            total_seconds: progress.total,
            fraction: progress.fraction,
        });

        let outcome = match self.observer.as_mut() {
            Some(observer) => observer.on_progress(progress),
            None => Ok(()),
        };
        if let Err(err) = outcome {
            warn!(error = %err, "Progress callback failed");
            self.emit_error(format!("progress failed: {err}"));
        }
    }

    fn emit(&mut self, event: PlaybackEvent) {
        self.pending_events.push(event);
    }

    fn emit_error(&mut self, message: String) {
        self.emit(PlaybackEvent::Error { message });
    }
}
