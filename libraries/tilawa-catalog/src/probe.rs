//! Audio duration probing.
//!
//! Used for segments the duration table does not cover. Probing reads the
//! container headers with symphonia; when the header carries no frame count
//! the packets are walked instead.

use crate::error::{CatalogError, Result};
use crate::source::ResourceLocation;
use async_trait::async_trait;
use reqwest::Client;
use std::io::Cursor;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::debug;

/// Determines the natural length of an audio resource
#[async_trait]
pub trait DurationProbe: Send + Sync {
    /// Duration in seconds of the resource at `resource`
    async fn probe(&self, resource: &str) -> Result<f64>;
}

/// Probe that downloads (or reads) the audio and parses it with symphonia
pub struct AudioDurationProbe {
    http: Client,
}

impl AudioDurationProbe {
    /// Create a probe using the given HTTP client
    pub fn new(http: Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl DurationProbe for AudioDurationProbe {
    async fn probe(&self, resource: &str) -> Result<f64> {
        let location = ResourceLocation::parse(resource)?;
        let bytes = location.fetch(&self.http).await?;
        let extension = location.extension();

        debug!(resource = %location, bytes = bytes.len(), "Probing audio duration");

        tokio::task::spawn_blocking(move || duration_of(bytes, extension.as_deref()))
            .await
            .map_err(|e| CatalogError::DecodeOrMetadataFailure(format!("Probe task failed: {e}")))?
    }
}

/// Read the duration of in-memory audio
pub fn duration_of(bytes: Vec<u8>, extension: Option<&str>) -> Result<f64> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes)), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = extension {
        hint.with_extension(ext);
    }

    let mut probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| CatalogError::DecodeOrMetadataFailure(format!("Failed to probe audio: {e}")))?;

    let track = probed
        .format
        .default_track()
        .ok_or_else(|| CatalogError::DecodeOrMetadataFailure("No audio track".into()))?;
    let track_id = track.id;
    let params = track.codec_params.clone();

    let time_base = params.time_base.ok_or_else(|| {
        CatalogError::DecodeOrMetadataFailure("Track has no time base".into())
    })?;

    let n_frames = match params.n_frames {
        Some(n_frames) => n_frames,
        None => {
            // No frame count in the header (e.g. MP3 without a Xing frame)
            let mut total = 0u64;
            while let Ok(packet) = probed.format.next_packet() {
                if packet.track_id() == track_id {
                    total += packet.dur;
                }
            }
            total
        }
    };

    let time = time_base.calc_time(n_frames);
    let seconds = time.seconds as f64 + time.frac;
    if seconds.is_finite() && seconds > 0.0 {
        Ok(seconds)
    } else {
        Err(CatalogError::DecodeOrMetadataFailure(
            "Audio has no measurable length".into(),
        ))
    }
}
