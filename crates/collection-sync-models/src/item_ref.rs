// Item references as written in collection files:
//   "The Matrix"
//   "The Matrix {tmdb-603}"
//   "Planet Earth {tvdb-79257}"
//   "Alien plex://movie/5d7768258718ba001e31bba9"

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::LibraryKind;

/// A naming scheme that can identify an item on the server
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum IdSource {
    Tmdb,
    Imdb,
    Tvdb,
    /// Server-native identifier (`plex://movie/...`)
    Plex,
}

const MOVIE_PREFERENCE: [IdSource; 3] = [IdSource::Tmdb, IdSource::Imdb, IdSource::Plex];
const SHOW_PREFERENCE: [IdSource; 3] = [IdSource::Tvdb, IdSource::Tmdb, IdSource::Plex];

impl IdSource {
    pub const ALL: [IdSource; 4] = [IdSource::Tmdb, IdSource::Imdb, IdSource::Tvdb, IdSource::Plex];

    /// Lookup order used when a reference carries more than one identifier
    pub fn preference(kind: LibraryKind) -> &'static [IdSource] {
        match kind {
            LibraryKind::Movie => &MOVIE_PREFERENCE,
            LibraryKind::Show => &SHOW_PREFERENCE,
        }
    }

    pub fn scheme(&self) -> &'static str {
        match self {
            IdSource::Tmdb => "tmdb",
            IdSource::Imdb => "imdb",
            IdSource::Tvdb => "tvdb",
            IdSource::Plex => "plex",
        }
    }

    /// Text that introduces this source's token inside a reference
    pub fn marker(&self) -> &'static str {
        match self {
            IdSource::Tmdb => "{tmdb-",
            IdSource::Imdb => "{imdb-",
            IdSource::Tvdb => "{tvdb-",
            IdSource::Plex => "plex://",
        }
    }

    /// Map a guid scheme to a source. Legacy agent schemes such as
    /// `com.plexapp.agents.imdb` or `com.plexapp.agents.themoviedb` are accepted.
    pub fn from_scheme(scheme: &str) -> Option<Self> {
        let name = scheme.rsplit('.').next().unwrap_or(scheme);
        match name {
            "tmdb" | "themoviedb" => Some(IdSource::Tmdb),
            "imdb" => Some(IdSource::Imdb),
            "tvdb" | "thetvdb" => Some(IdSource::Tvdb),
            "plex" => Some(IdSource::Plex),
            _ => None,
        }
    }

    /// Pull this source's identifier out of a reference string.
    ///
    /// The plex token runs to the next whitespace, the braced tokens run to the
    /// next `}`. A token with an empty body or no closing brace yields `None`.
    fn extract_from(&self, reference: &str) -> Option<String> {
        let marker = self.marker();
        let start = reference.find(marker)? + marker.len();
        let rest = &reference[start..];

        let id = match self {
            IdSource::Plex => rest.split(char::is_whitespace).next().unwrap_or(""),
            _ => &rest[..rest.find('}')?],
        };

        if id.is_empty() {
            None
        } else {
            Some(id.to_string())
        }
    }
}

impl fmt::Display for IdSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.scheme())
    }
}

/// Whether an extracted identifier is returned bare (`603`) or with its
/// scheme (`tmdb://603`), the form the server uses in guid lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdForm {
    Bare,
    Full,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExternalId {
    pub source: IdSource,
    pub id: String,
}

impl ExternalId {
    pub fn new(source: IdSource, id: impl Into<String>) -> Self {
        Self { source, id: id.into() }
    }

    /// `<scheme>://<id>`, matching the guids reported by the server
    pub fn full(&self) -> String {
        format!("{}://{}", self.source.scheme(), self.id)
    }

    pub fn render(&self, form: IdForm) -> String {
        match form {
            IdForm::Bare => self.id.clone(),
            IdForm::Full => self.full(),
        }
    }

    /// Parse a server guid such as `tmdb://603` or
    /// `com.plexapp.agents.imdb://tt0133093?lang=en`
    pub fn from_guid(guid: &str) -> Option<Self> {
        let (scheme, rest) = guid.split_once("://")?;
        let source = IdSource::from_scheme(scheme)?;
        let id = rest.split('?').next().unwrap_or("").trim();
        if id.is_empty() {
            return None;
        }
        Some(Self::new(source, id))
    }

    /// Token form used inside a reference string
    pub fn token(&self) -> String {
        match self.source {
            IdSource::Plex => self.full(),
            source => format!("{}{}}}", source.marker(), self.id),
        }
    }
}

/// One entry of a collection's `items` list, parsed once when the file is loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ItemReference {
    /// The string exactly as written in the file
    pub raw: String,
    /// Everything before the first identifier token, trimmed
    pub title: String,
    /// Every identifier token found in the string
    pub ids: Vec<ExternalId>,
}

impl ItemReference {
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let title = strip_identifier(&raw).to_string();
        let ids = IdSource::ALL
            .iter()
            .filter_map(|source| source.extract_from(&raw).map(|id| ExternalId::new(*source, id)))
            .collect();
        Self { raw, title, ids }
    }

    /// Build the reference string written by dumps: `<title> <token>`
    pub fn from_parts(title: &str, id: Option<&ExternalId>) -> Self {
        match id {
            Some(id) => Self::parse(format!("{} {}", title, id.token())),
            None => Self::parse(title),
        }
    }

    /// The identifier to look the item up by, following the kind's source preference
    pub fn identifier(&self, kind: LibraryKind) -> Option<&ExternalId> {
        IdSource::preference(kind)
            .iter()
            .find_map(|source| self.ids.iter().find(|id| id.source == *source))
    }
}

impl From<String> for ItemReference {
    fn from(raw: String) -> Self {
        Self::parse(raw)
    }
}

impl From<&str> for ItemReference {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<ItemReference> for String {
    fn from(reference: ItemReference) -> Self {
        reference.raw
    }
}

impl fmt::Display for ItemReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Title part of a reference: the text before the first identifier marker
pub fn strip_identifier(reference: &str) -> &str {
    let cut = IdSource::ALL
        .iter()
        .filter_map(|source| reference.find(source.marker()))
        .min()
        .unwrap_or(reference.len());
    reference[..cut].trim()
}

/// Extract the preferred identifier of `reference` for a library of `kind`.
///
/// Sources are tried in the kind's preference order; a malformed token of a
/// preferred source falls through to the next source.
pub fn extract_identifier(reference: &str, kind: LibraryKind, form: IdForm) -> Option<String> {
    IdSource::preference(kind).iter().find_map(|source| {
        source
            .extract_from(reference)
            .map(|id| ExternalId::new(*source, id).render(form))
    })
}
