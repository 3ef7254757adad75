//! Remote and local resource locations.
//!
//! Duration tables and audio files are addressed the same way: an HTTP(S)
//! URL, a `file://` URL or a bare filesystem path.

use crate::error::{CatalogError, Result};
use reqwest::Client;
use std::fmt;
use std::path::PathBuf;
use tracing::debug;
use url::Url;

/// A fetchable resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceLocation {
    /// HTTP(S) URL
    Remote(Url),

    /// Local file
    Local(PathBuf),
}

impl ResourceLocation {
    /// Classify a raw reference
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(CatalogError::InvalidUrl("reference cannot be empty".into()));
        }

        if raw.starts_with("http://") || raw.starts_with("https://") {
            let url = Url::parse(raw).map_err(|e| CatalogError::InvalidUrl(format!("{raw}: {e}")))?;
            return Ok(Self::Remote(url));
        }

        if raw.starts_with("file://") {
            let url = Url::parse(raw).map_err(|e| CatalogError::InvalidUrl(format!("{raw}: {e}")))?;
            let path = url
                .to_file_path()
                .map_err(|()| CatalogError::InvalidUrl(format!("{raw}: not a local path")))?;
            return Ok(Self::Local(path));
        }

        Ok(Self::Local(PathBuf::from(raw)))
    }

    /// File extension, used as a format hint
    pub fn extension(&self) -> Option<String> {
        let name = match self {
            Self::Remote(url) => url.path_segments()?.last()?.to_string(),
            Self::Local(path) => path.file_name()?.to_string_lossy().into_owned(),
        };
        let (_, ext) = name.rsplit_once('.')?;
        (!ext.is_empty()).then(|| ext.to_ascii_lowercase())
    }

    /// Read the whole resource
    pub async fn fetch(&self, http: &Client) -> Result<Vec<u8>> {
        match self {
            Self::Remote(url) => {
                debug!(url = %url, "Fetching resource");

                let response = http.get(url.clone()).send().await.map_err(|e| {
                    if e.is_connect() || e.is_timeout() {
                        CatalogError::ResourceUnreachable(e.to_string())
                    } else {
                        CatalogError::Request(e)
                    }
                })?;

                let status = response.status();
                if !status.is_success() {
                    let message = response.text().await.unwrap_or_default();
                    return Err(CatalogError::ServerError {
                        status: status.as_u16(),
                        message,
                    });
                }

                let bytes = response.bytes().await.map_err(|e| {
                    if e.is_timeout() {
                        CatalogError::ResourceUnreachable(e.to_string())
                    } else {
                        CatalogError::Request(e)
                    }
                })?;
                Ok(bytes.to_vec())
            }
            Self::Local(path) => {
                debug!(path = %path.display(), "Reading resource");

                tokio::fs::read(path).await.map_err(|e| {
                    if e.kind() == std::io::ErrorKind::NotFound {
                        CatalogError::ResourceUnreachable(format!("{}: {e}", path.display()))
                    } else {
                        CatalogError::Io(e)
                    }
                })
            }
        }
    }
}

impl fmt::Display for ResourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote(url) => write!(f, "{url}"),
            Self::Local(path) => write!(f, "{}", path.display()),
        }
    }
}
