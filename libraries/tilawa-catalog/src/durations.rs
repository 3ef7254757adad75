//! Duration table: precomputed segment lengths per program.
//!
//! The table is a static JSON document shaped like
//!
//! ```json
//! { "58": { "reciter": "7", "verses": { "58:1": 12.3, "58:2": 9.8 } } }
//! ```
//!
//! `"segments"` is accepted in place of `"verses"`, and a program may map
//! straight to `{ key: seconds }`. Entries that are not positive finite
//! numbers are dropped; a zero length means unknown, same as no entry.

use crate::error::{CatalogError, Result};
use crate::source::ResourceLocation;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tilawa_core::{ProgramId, SegmentKey};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// `(program, segment key) -> seconds`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DurationTable {
    programs: HashMap<String, HashMap<String, f64>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ProgramEntry {
    Keyed {
        #[serde(alias = "segments")]
        verses: HashMap<String, Value>,
    },
    Bare(HashMap<String, Value>),
}

impl DurationTable {
    /// Table with no entries
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a duration document
    ///
    /// The document must be a JSON object. Programs whose value has an
    /// unrecognized shape are skipped.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let document: HashMap<String, Value> = serde_json::from_slice(bytes)
            .map_err(|e| CatalogError::ParseError(format!("Failed to parse duration table: {e}")))?;

        let mut programs = HashMap::with_capacity(document.len());
        for (program, entry) in document {
            let segments = match serde_json::from_value::<ProgramEntry>(entry) {
                Ok(ProgramEntry::Keyed { verses }) => verses,
                Ok(ProgramEntry::Bare(map)) => map,
                Err(e) => {
                    warn!(program = %program, error = %e, "Skipping malformed duration entry");
                    continue;
                }
            };

            let durations: HashMap<String, f64> = segments
                .into_iter()
                .filter_map(|(key, value)| {
                    let seconds = value.as_f64()?;
                    (seconds.is_finite() && seconds > 0.0).then(|| (key.trim().to_string(), seconds))
                })
                .collect();

            programs.insert(program.trim().to_string(), durations);
        }

        Ok(Self { programs })
    }

    /// Seconds for a segment, if the table knows it
    pub fn lookup(&self, program: &ProgramId, key: &SegmentKey) -> Option<f64> {
        self.programs
            .get(program.as_str())
            .and_then(|segments| segments.get(key.as_str()))
            .copied()
    }

    /// Whether the table has entries for a program
    pub fn has_program(&self, program: &ProgramId) -> bool {
        self.programs.contains_key(program.as_str())
    }

    /// Number of programs
    pub fn program_count(&self) -> usize {
        self.programs.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.programs.values().all(HashMap::is_empty)
    }
}

/// Loads the duration table at most once per session
///
/// A failed load is not retried: the empty table it degrades to is what
/// later calls get.
pub struct DurationTableLoader {
    http: Client,
    source: ResourceLocation,
    table: OnceCell<Arc<DurationTable>>,
}

impl DurationTableLoader {
    /// Loader for the table at `source`
    pub fn new(http: Client, source: ResourceLocation) -> Self {
        Self {
            http,
            source,
            table: OnceCell::new(),
        }
    }

    /// Loader that already holds a table
    pub fn preloaded(table: DurationTable) -> Self {
        Self {
            http: Client::new(),
            source: ResourceLocation::Local(Default::default()),
            table: OnceCell::new_with(Some(Arc::new(table))),
        }
    }

    /// Where the table is read from
    pub fn source(&self) -> &ResourceLocation {
        &self.source
    }

    /// Whether a load already completed
    pub fn is_loaded(&self) -> bool {
        self.table.initialized()
    }

    /// Get the table, loading it on first use
    ///
    /// Never fails: an unreachable or malformed document yields an empty
    /// table and playlist building falls back to probing.
    pub async fn load(&self) -> Arc<DurationTable> {
        if let Some(table) = self.table.get() {
            debug!(source = %self.source, "Duration table cache hit");
            return table.clone();
        }

        self.table
            .get_or_init(|| async {
                match self.fetch().await {
                    Ok(table) => {
                        info!(
                            source = %self.source,
                            programs = table.program_count(),
                            "Loaded duration table"
                        );
                        Arc::new(table)
                    }
                    Err(e) => {
                        warn!(
                            source = %self.source,
                            error = %e,
                            "Duration table unavailable, falling back to probing"
                        );
                        Arc::new(DurationTable::empty())
                    }
                }
            })
            .await
            .clone()
    }

    /// Fetch and parse the table, bypassing the cache
    pub async fn fetch(&self) -> Result<DurationTable> {
        let bytes = self.source.fetch(&self.http).await?;
        DurationTable::parse(&bytes)
    }
}
