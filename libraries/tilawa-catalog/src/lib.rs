//! Tilawa Catalog
//!
//! Turns a program's text units into a playable [`Playlist`] with known
//! segment lengths.
//!
//! # Features
//!
//! - **Duration table**: precomputed lengths, fetched once per session over HTTP or from disk
//! - **Probing**: symphonia-based fallback for segments the table lacks
//! - **Playlist building**: concurrent, order-preserving, never fails on bad audio
//! - **Program switching**: superseded builds are cancelled
//! - **Source mapping**: quran.com verse/recitation listings and hadith fixtures to units
//!
//! # Example
//!
//! ```ignore
//! use tilawa_catalog::{CatalogConfig, PlaylistBuilder, ProgramLoader};
//! use tilawa_core::ProgramId;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = CatalogConfig::load()?;
//!     config.validate()?;
//!
//!     let loader = ProgramLoader::new(PlaylistBuilder::from_config(&config)?);
//!     let units = fetch_units_somehow(112).await?;
//!
//!     if let Some(program) = loader.load(ProgramId::surah(112), units).await {
//!         println!("{} segments, {:.1}s", program.playlist.len(), program.playlist.total_duration());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! [`Playlist`]: tilawa_core::Playlist

mod builder;
mod config;
mod durations;
mod error;
mod loader;
mod probe;
mod source;
pub mod units;

pub use builder::PlaylistBuilder;
pub use config::CatalogConfig;
pub use durations::{DurationTable, DurationTableLoader};
pub use error::{CatalogError, Result};
pub use loader::{LoadedProgram, ProgramLoader};
pub use probe::{duration_of, AudioDurationProbe, DurationProbe};
pub use source::ResourceLocation;
pub use units::{AudioBase, HadithChapter, RecitationResponse, VersesResponse};
