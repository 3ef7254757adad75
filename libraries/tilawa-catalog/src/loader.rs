//! Program loading with cancellation of superseded builds.

use crate::builder::PlaylistBuilder;
use std::sync::atomic::{AtomicU64, Ordering};
use tilawa_core::{Playlist, ProgramId, SourceUnit};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// A built program, tagged with the load that produced it
#[derive(Debug, Clone)]
pub struct LoadedProgram {
    /// Load generation; larger is newer
    pub generation: u64,

    /// The playlist
    pub playlist: Playlist,
}

/// Builds playlists for program switches
///
/// Starting a load cancels the build (and the probes) of any load still in
/// flight, so a slow program can never replace a newer one.
pub struct ProgramLoader {
    builder: PlaylistBuilder,
    generation: AtomicU64,
    in_flight: Mutex<Option<CancellationToken>>,
}

impl ProgramLoader {
    /// Create a loader
    pub fn new(builder: PlaylistBuilder) -> Self {
        Self {
            builder,
            generation: AtomicU64::new(0),
            in_flight: Mutex::new(None),
        }
    }

    /// The builder in use
    pub fn builder(&self) -> &PlaylistBuilder {
        &self.builder
    }

    /// Generation of the most recent load request
    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Build the playlist for a program
    ///
    /// Returns `None` when another `load` or a `cancel` superseded this one
    /// before it finished.
    pub async fn load(&self, program_id: ProgramId, units: Vec<SourceUnit>) -> Option<LoadedProgram> {
        let token = CancellationToken::new();
        let generation = {
            let mut in_flight = self.in_flight.lock().await;
            if let Some(previous) = in_flight.replace(token.clone()) {
                previous.cancel();
            }
            self.generation.fetch_add(1, Ordering::SeqCst) + 1
        };

        debug!(program = %program_id, generation, units = units.len(), "Loading program");

        let playlist = tokio::select! {
            biased;
            () = token.cancelled() => None,
            playlist = self.builder.build(&program_id, units) => Some(playlist),
        };

        match playlist {
            Some(playlist) if self.current_generation() == generation => {
                info!(
                    program = %program_id,
                    generation,
                    segments = playlist.len(),
                    total_seconds = playlist.total_duration(),
                    "Program ready"
                );
                self.release(generation).await;
                Some(LoadedProgram {
                    generation,
                    playlist,
                })
            }
            _ => {
                debug!(program = %program_id, generation, "Program load superseded");
                None
            }
        }
    }

    /// Cancel the load in flight, if any
    pub async fn cancel(&self) {
        let mut in_flight = self.in_flight.lock().await;
        if let Some(token) = in_flight.take() {
            token.cancel();
        }
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    async fn release(&self, generation: u64) {
        let mut in_flight = self.in_flight.lock().await;
        if self.current_generation() == generation {
            in_flight.take();
        }
    }
}
