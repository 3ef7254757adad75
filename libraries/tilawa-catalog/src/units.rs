//! Mapping of external text sources into source units.
//!
//! Each external JSON shape is validated once here and turned into ordered
//! [`SourceUnit`]s with fully resolved audio references. Historical field
//! names are accepted at this boundary so nothing downstream has to care.

use crate::error::{CatalogError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use tilawa_core::{SegmentKey, SourceUnit, TextRef};
use tracing::warn;
use url::Url;

// ===== Audio Base =====

/// Base URL that relative audio paths are joined to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioBase {
    url: Url,
}

impl AudioBase {
    /// Parse a base URL
    ///
    /// A trailing slash is assumed whether or not it is written, so
    /// `https://host/audio` and `https://host/audio/` behave the same.
    pub fn new(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(CatalogError::InvalidUrl("URL cannot be empty".into()));
        }

        let mut url = Url::parse(raw).map_err(|e| CatalogError::InvalidUrl(format!("{raw}: {e}")))?;
        if url.cannot_be_a_base() {
            return Err(CatalogError::InvalidUrl(format!("{raw}: cannot be a base")));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        Ok(Self { url })
    }

    /// The normalized base
    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    /// Resolve an audio reference to a full URL
    ///
    /// Absolute URLs pass through. Protocol-relative references (`//host/x`)
    /// take the base's scheme. Anything else is a path joined to the base
    /// with exactly one slash.
    pub fn resolve(&self, reference: &str) -> Result<String> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(CatalogError::InvalidUrl("audio reference cannot be empty".into()));
        }

        if reference.starts_with("//") {
            let absolute = format!("{}:{}", self.url.scheme(), reference);
            return Url::parse(&absolute)
                .map(String::from)
                .map_err(|e| CatalogError::InvalidUrl(format!("{reference}: {e}")));
        }

        if let Ok(url) = Url::parse(reference) {
            return Ok(url.into());
        }

        self.url
            .join(reference.trim_start_matches('/'))
            .map(String::from)
            .map_err(|e| CatalogError::InvalidUrl(format!("{reference}: {e}")))
    }
}

// ===== quran.com Shapes =====

/// Verse listing of a chapter
#[derive(Debug, Clone, Deserialize)]
pub struct VersesResponse {
    /// Verses in reading order
    pub verses: Vec<VerseRecord>,
}

/// One verse
#[derive(Debug, Clone, Deserialize)]
pub struct VerseRecord {
    /// Number within the chapter, from 1
    pub verse_number: u16,

    /// `"surah:verse"`, when the API includes it
    #[serde(default)]
    pub verse_key: Option<String>,

    /// Uthmani script text
    #[serde(default)]
    pub text_uthmani: Option<String>,
}

/// Recitation audio listing of a chapter
#[derive(Debug, Clone, Deserialize)]
pub struct RecitationResponse {
    /// One file per verse
    pub audio_files: Vec<AudioFileRecord>,
}

/// One recitation audio file
#[derive(Debug, Clone, Deserialize)]
pub struct AudioFileRecord {
    /// `"surah:verse"`
    pub verse_key: String,

    /// Path relative to the audio base, or a full URL
    #[serde(default, alias = "audio_url")]
    pub url: Option<String>,
}

// ===== Hadith Shapes =====

/// Hadith chapter fixture
#[derive(Debug, Clone, Deserialize)]
pub struct HadithChapter {
    /// Hadiths in reading order
    pub hadiths: Vec<HadithRecord>,
}

/// One hadith
#[derive(Debug, Clone, Deserialize)]
pub struct HadithRecord {
    /// Collection-wide id
    #[serde(default)]
    pub id: Option<u64>,

    /// Number within the book
    #[serde(rename = "idInBook", alias = "number")]
    pub id_in_book: u32,

    /// Narration audio, if recorded
    #[serde(default)]
    pub audio: Option<String>,
}

/// Parse one of the JSON shapes above
pub fn from_json<'a, T: Deserialize<'a>>(json: &'a str) -> Result<T> {
    serde_json::from_str(json).map_err(|e| CatalogError::ParseError(e.to_string()))
}

// ===== Mapping =====

/// Units for a chapter of the Quran
///
/// Verses keep their listing order. A verse without a recitation file, or
/// whose file reference cannot be resolved, becomes a text-only unit.
pub fn verse_units(
    surah: u16,
    verses: &VersesResponse,
    recitation: &RecitationResponse,
    base: &AudioBase,
) -> Result<Vec<SourceUnit>> {
    let files: HashMap<SegmentKey, &str> = recitation
        .audio_files
        .iter()
        .filter_map(|file| {
            let key = SegmentKey::parse(&file.verse_key).ok()?;
            let url = file.url.as_deref()?;
            Some((key, url))
        })
        .collect();

    verses
        .verses
        .iter()
        .map(|verse| {
            if verse.verse_number == 0 {
                return Err(CatalogError::ParseError(format!(
                    "verse number 0 in surah {surah}"
                )));
            }

            let key = SegmentKey::verse(surah, verse.verse_number);
            if let Some(raw) = verse.verse_key.as_deref() {
                if SegmentKey::parse(raw)? != key {
                    return Err(CatalogError::ParseError(format!(
                        "verse key {raw} does not match {key}"
                    )));
                }
            }

            let resource = files
                .get(&key)
                .and_then(|reference| resolve_or_skip(base, &key, reference));

            Ok(SourceUnit::new(
                key,
                resource,
                TextRef::new(format!("verse-{}", verse.verse_number)),
            ))
        })
        .collect()
}

/// Units for a hadith chapter
///
/// Relative audio paths need a base; without one only absolute references
/// are kept.
pub fn hadith_units(
    collection: &str,
    chapter: u32,
    fixture: &HadithChapter,
    base: Option<&AudioBase>,
) -> Result<Vec<SourceUnit>> {
    if collection.trim().is_empty() {
        return Err(CatalogError::ParseError("empty hadith collection".into()));
    }

    Ok(fixture
        .hadiths
        .iter()
        .map(|hadith| {
            let key = SegmentKey::hadith(collection, chapter, hadith.id_in_book);
            let resource = hadith.audio.as_deref().and_then(|reference| match base {
                Some(base) => resolve_or_skip(base, &key, reference),
                None => Url::parse(reference.trim()).ok().map(String::from),
            });

            SourceUnit::new(
                key,
                resource,
                TextRef::new(format!("hadith-{}", hadith.id_in_book)),
            )
        })
        .collect())
}

fn resolve_or_skip(base: &AudioBase, key: &SegmentKey, reference: &str) -> Option<String> {
    match base.resolve(reference) {
        Ok(url) => Some(url),
        Err(e) => {
            warn!(key = %key, reference = %reference, error = %e, "Dropping unusable audio reference");
            None
        }
    }
}
