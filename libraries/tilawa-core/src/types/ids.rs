/// Identifier types for programs, segments and on-screen units
use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Program identifier (a surah number, or `collection/chapter` for hadith)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgramId(String);

impl ProgramId {
    /// Create a new program ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Program ID for a surah
    pub fn surah(number: u16) -> Self {
        Self(number.to_string())
    }

    /// Program ID for a hadith chapter
    pub fn hadith_chapter(collection: &str, chapter: u32) -> Self {
        Self(format!("{collection}/{chapter}"))
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProgramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ProgramId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Stable segment identifier
///
/// Verses use `"surah:verse"`, hadiths use `"collection:chapter:number"`.
/// Keys are compared verbatim; they are what the duration table is keyed on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SegmentKey(String);

impl SegmentKey {
    /// Key for a Quran verse
    pub fn verse(surah: u16, verse: u16) -> Self {
        Self(format!("{surah}:{verse}"))
    }

    /// Key for a hadith within a collection chapter
    pub fn hadith(collection: &str, chapter: u32, number: u32) -> Self {
        Self(format!("{collection}:{chapter}:{number}"))
    }

    /// Parse and validate a key
    ///
    /// A key has two or three non-empty `:`-separated parts and no whitespace.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let parts: Vec<&str> = trimmed.split(':').collect();

        let well_formed = (2..=3).contains(&parts.len())
            && parts
                .iter()
                .all(|p| !p.is_empty() && !p.chars().any(char::is_whitespace));

        if well_formed {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(CoreError::invalid_key(raw))
        }
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last component of the key (verse or hadith number)
    pub fn ordinal(&self) -> Option<u32> {
        self.0.rsplit(':').next().and_then(|n| n.parse().ok())
    }
}

impl fmt::Display for SegmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SegmentKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SegmentKey {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<SegmentKey> for String {
    fn from(key: SegmentKey) -> Self {
        key.0
    }
}

/// Opaque handle to the on-screen unit a segment highlights
///
/// The renderer decides what it means (typically an element id like `verse-3`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TextRef(String);

impl TextRef {
    /// Create a new text handle
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TextRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
