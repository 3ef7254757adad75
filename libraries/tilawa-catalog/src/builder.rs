//! Playlist building.

use crate::config::CatalogConfig;
use crate::durations::{DurationTable, DurationTableLoader};
use crate::error::Result;
use crate::probe::{AudioDurationProbe, DurationProbe};
use crate::source::ResourceLocation;
use futures_util::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tilawa_core::{Playlist, ProgramId, Segment, SourceUnit};
use tracing::{debug, warn};

/// Turns ordered source units into a playlist with durations
///
/// Durations come from the duration table when it has the segment, otherwise
/// from one probe of the segment's audio. Probes run concurrently; each is
/// bounded by a timeout and any failure counts as an unknown (`0`) length.
#[derive(Clone)]
pub struct PlaylistBuilder {
    durations: Arc<DurationTableLoader>,
    probe: Arc<dyn DurationProbe>,
    probe_timeout: Duration,
}

impl PlaylistBuilder {
    /// Create a builder
    pub fn new(durations: Arc<DurationTableLoader>, probe: Arc<dyn DurationProbe>) -> Self {
        Self {
            durations,
            probe,
            probe_timeout: Duration::from_secs(20),
        }
    }

    /// Builder reading the configured duration table and probing over HTTP
    pub fn from_config(config: &CatalogConfig) -> Result<Self> {
        let http = config.http_client()?;
        let source = ResourceLocation::parse(&config.durations_source)?;

        Ok(Self::new(
            Arc::new(DurationTableLoader::new(http.clone(), source)),
            Arc::new(AudioDurationProbe::new(http)),
        )
        .with_probe_timeout(config.probe_timeout()))
    }

    /// Set the upper bound for a single probe
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// The duration table loader in use
    pub fn durations(&self) -> &Arc<DurationTableLoader> {
        &self.durations
    }

    /// Build the playlist for `program_id`
    ///
    /// Output order is input order. Units without audio are kept with a zero
    /// duration.
    pub async fn build(&self, program_id: &ProgramId, units: Vec<SourceUnit>) -> Playlist {
        let table = self.durations.load().await;

        let segments = join_all(units.into_iter().map(|unit| {
            let table = Arc::clone(&table);
            async move {
                let seconds = self.duration_for(&table, program_id, &unit).await;
                Segment::from_unit(unit, seconds)
            }
        }))
        .await;

        let playlist = Playlist::new(program_id.clone(), segments);
        debug!(
            program = %program_id,
            segments = playlist.len(),
            total_seconds = playlist.total_duration(),
            "Built playlist"
        );
        playlist
    }

    async fn duration_for(&self, table: &DurationTable, program_id: &ProgramId, unit: &SourceUnit) -> f64 {
        let Some(resource) = unit
            .resource_ref
            .as_deref()
            .filter(|r| !r.trim().is_empty())
        else {
            return 0.0;
        };

        if let Some(seconds) = table.lookup(program_id, &unit.key) {
            return seconds;
        }

        match tokio::time::timeout(self.probe_timeout, self.probe.probe(resource)).await {
            Ok(Ok(seconds)) if seconds.is_finite() && seconds > 0.0 => seconds,
            Ok(Ok(seconds)) => {
                warn!(key = %unit.key, seconds, "Probe returned unusable duration");
                0.0
            }
            Ok(Err(e)) => {
                warn!(key = %unit.key, resource = %resource, error = %e, "Duration probe failed");
                0.0
            }
            Err(_) => {
                warn!(
                    key = %unit.key,
                    resource = %resource,
                    timeout_secs = self.probe_timeout.as_secs_f64(),
                    "Duration probe timed out"
                );
                0.0
            }
        }
    }
}
