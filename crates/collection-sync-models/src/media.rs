use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The kind of items a library section holds. Only movie and show sections
/// can carry collections managed by this tool.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LibraryKind {
    Movie,
    Show,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown library kind: {0:?} (expected \"movie\" or \"show\")")]
pub struct UnknownKind(pub String);

impl LibraryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LibraryKind::Movie => "movie",
            LibraryKind::Show => "show",
        }
    }

    /// Plex metadata type number used in `type=` query parameters
    pub fn plex_type(&self) -> u8 {
        match self {
            LibraryKind::Movie => 1,
            LibraryKind::Show => 2,
        }
    }
}

impl FromStr for LibraryKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movie" => Ok(LibraryKind::Movie),
            "show" => Ok(LibraryKind::Show),
            other => Err(UnknownKind(other.to_string())),
        }
    }
}

impl fmt::Display for LibraryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single movie or show as reported by the server.
///
/// `guid` is the server-native identifier (`plex://movie/...`), `guids` holds the
/// external agent identifiers (`tmdb://603`, `imdb://tt0133093`, `tvdb://81189`).
/// The remaining optional fields are only used by the full library dump.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct MediaItem {
    pub rating_key: String,
    pub guid: String,
    pub title: String,
    #[serde(default)]
    pub guids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_sort: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_rating: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub studio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub originally_available_at: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub added_at: Option<DateTime<Utc>>,
}

impl MediaItem {
    pub fn new(rating_key: impl Into<String>, guid: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            rating_key: rating_key.into(),
            guid: guid.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_guids<I, S>(mut self, guids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.guids = guids.into_iter().map(Into::into).collect();
        self
    }

    /// True if `guid` is either the native identifier or one of the external ones
    pub fn has_guid(&self, guid: &str) -> bool {
        (!self.guid.is_empty() && self.guid == guid) || self.guids.iter().any(|g| g == guid)
    }
}
