use collection_sync_models::{CollectionMode, CollectionSort, ItemReference, PosterSource};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::CollectionFileRef;

#[derive(Debug, Error)]
pub enum CollectionFileError {
    #[error("failed to read collection file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse collection file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Desired state of one collection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<ItemReference>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_sort: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_rating: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<CollectionMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<CollectionSort>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl CollectionEntry {
    pub fn with_items<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ItemReference>,
    {
        Self {
            items: Some(items.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// Configured references; empty when `items` is missing
    pub fn items(&self) -> &[ItemReference] {
        self.items.as_deref().unwrap_or(&[])
    }

    /// True when `items` is present and lists at least one reference
    pub fn has_items(&self) -> bool {
        !self.items().is_empty()
    }

    pub fn title_sort(&self) -> Option<&str> {
        non_empty(&self.title_sort)
    }

    pub fn content_rating(&self) -> Option<&str> {
        non_empty(&self.content_rating)
    }

    pub fn summary(&self) -> Option<&str> {
        non_empty(&self.summary)
    }

    pub fn poster(&self) -> Option<PosterSource> {
        non_empty(&self.poster).map(PosterSource::parse)
    }

    /// Configured labels only when the key is present and non-empty
    pub fn labels(&self) -> Option<&[String]> {
        self.labels.as_deref().filter(|l| !l.is_empty())
    }

    /// Overlay the fields present in `later` onto this entry
    pub fn merge_from(&mut self, later: CollectionEntry) {
        if later.items.is_some() {
            self.items = later.items;
        }
        if later.labels.is_some() {
            self.labels = later.labels;
        }
        if later.title_sort.is_some() {
            self.title_sort = later.title_sort;
        }
        if later.content_rating.is_some() {
            self.content_rating = later.content_rating;
        }
        if later.summary.is_some() {
            self.summary = later.summary;
        }
        if later.poster.is_some() {
            self.poster = later.poster;
        }
        if later.mode.is_some() {
            self.mode = later.mode;
        }
        if later.sort.is_some() {
            self.sort = later.sort;
        }
    }
}

/// Contents of one collection file: `collections:` mapping title → entry
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CollectionsFile {
    pub collections: BTreeMap<String, CollectionEntry>,
}

#[derive(Deserialize)]
struct RawCollectionsFile {
    #[serde(default)]
    collections: Option<BTreeMap<String, Option<CollectionEntry>>>,
}

impl CollectionsFile {
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        let raw: RawCollectionsFile = serde_yaml::from_str(content)?;
        let collections = raw
            .collections
            .unwrap_or_default()
            .into_iter()
            .map(|(title, entry)| (title, entry.unwrap_or_default()))
            .collect();
        Ok(Self { collections })
    }

    pub fn load(path: &Path) -> Result<Self, CollectionFileError> {
        let content = std::fs::read_to_string(path).map_err(|source| CollectionFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content).map_err(|source| CollectionFileError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

/// Merged collection declarations of a single library
#[derive(Debug, Clone, Default)]
pub struct LibraryCollections {
    pub library: String,
    entries: BTreeMap<String, CollectionEntry>,
}

impl LibraryCollections {
    pub fn new(library: impl Into<String>) -> Self {
        Self {
            library: library.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Load every configured file in order. Unreadable or malformed files are
    /// logged and skipped; later files override earlier ones per collection.
    pub fn load(library: &str, files: &[CollectionFileRef]) -> Self {
        let mut collections = Self::new(library);
        for file_ref in files {
            match CollectionsFile::load(&file_ref.file) {
                Ok(file) => {
                    debug!(
                        library = library,
                        file = %file_ref.file.display(),
                        collections = file.collections.len(),
                        "Loaded collection file"
                    );
                    collections.merge_file(file);
                }
                Err(e) => {
                    warn!(library = library, "Skipping collection file: {}", e);
                }
            }
        }
        collections
    }

    pub fn merge_file(&mut self, file: CollectionsFile) {
        for (title, entry) in file.collections {
            self.insert(title, entry);
        }
    }

    pub fn insert(&mut self, title: impl Into<String>, entry: CollectionEntry) {
        match self.entries.entry(title.into()) {
            std::collections::btree_map::Entry::Occupied(mut existing) => {
                existing.get_mut().merge_from(entry);
            }
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(entry);
            }
        }
    }

    pub fn get(&self, title: &str) -> Option<&CollectionEntry> {
        self.entries.get(title)
    }

    pub fn titles(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &CollectionEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
