use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How a collection is displayed in its library (`collectionMode` pref)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum CollectionMode {
    #[default]
    Default,
    Hide,
    HideItems,
    ShowItems,
}

impl CollectionMode {
    pub fn plex_value(&self) -> i32 {
        match self {
            CollectionMode::Default => -1,
            CollectionMode::Hide => 0,
            CollectionMode::HideItems => 1,
            CollectionMode::ShowItems => 2,
        }
    }

    pub fn from_plex_value(value: i64) -> Option<Self> {
        match value {
            -1 => Some(CollectionMode::Default),
            0 => Some(CollectionMode::Hide),
            1 => Some(CollectionMode::HideItems),
            2 => Some(CollectionMode::ShowItems),
            _ => None,
        }
    }
}

/// Item ordering inside a collection (`collectionSort` pref)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CollectionSort {
    #[default]
    Release,
    Alpha,
    Custom,
}

impl CollectionSort {
    pub fn plex_value(&self) -> i32 {
        match self {
            CollectionSort::Release => 0,
            CollectionSort::Alpha => 1,
            CollectionSort::Custom => 2,
        }
    }

    pub fn from_plex_value(value: i64) -> Option<Self> {
        match value {
            0 => Some(CollectionSort::Release),
            1 => Some(CollectionSort::Alpha),
            2 => Some(CollectionSort::Custom),
            _ => None,
        }
    }
}

/// Scalar collection fields that can be edited and locked on the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionField {
    TitleSort,
    ContentRating,
    Summary,
}

impl CollectionField {
    /// Attribute name used by the server in edit queries and `Field` lock lists
    pub fn name(&self) -> &'static str {
        match self {
            CollectionField::TitleSort => "titleSort",
            CollectionField::ContentRating => "contentRating",
            CollectionField::Summary => "summary",
        }
    }
}

/// Where a poster image comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PosterSource {
    Url(String),
    File(PathBuf),
}

impl PosterSource {
    /// `http://` and `https://` values are fetched by the server, anything else
    /// is read from the local filesystem and uploaded.
    pub fn parse(value: &str) -> Self {
        if value.starts_with("http://") || value.starts_with("https://") {
            PosterSource::Url(value.to_string())
        } else {
            PosterSource::File(PathBuf::from(value))
        }
    }
}

/// A collection as it currently exists on the server
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Collection {
    pub rating_key: String,
    pub title: String,
    /// Rule-driven collection; membership cannot be edited
    pub smart: bool,
    pub title_sort: Option<String>,
    pub content_rating: Option<String>,
    pub summary: Option<String>,
    pub labels: Vec<String>,
    pub mode: Option<CollectionMode>,
    pub sort: Option<CollectionSort>,
    /// Fields the server reports as user-set (locked)
    pub locked_fields: Vec<String>,
}

impl Collection {
    pub fn new(rating_key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            rating_key: rating_key.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn is_locked(&self, field: CollectionField) -> bool {
        self.locked_fields.iter().any(|f| f == field.name())
    }

    pub fn field(&self, field: CollectionField) -> Option<&str> {
        match field {
            CollectionField::TitleSort => self.title_sort.as_deref(),
            CollectionField::ContentRating => self.content_rating.as_deref(),
            CollectionField::Summary => self.summary.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_plex_values() {
        for mode in [
            CollectionMode::Default,
            CollectionMode::Hide,
            CollectionMode::HideItems,
            CollectionMode::ShowItems,
        ] {
            assert_eq!(CollectionMode::from_plex_value(mode.plex_value() as i64), Some(mode));
        }
        assert_eq!(CollectionMode::from_plex_value(7), None);
    }

    #[test]
    fn test_poster_source_parse() {
        assert_eq!(
            PosterSource::parse("https://image.tmdb.org/t/p/original/a.jpg"),
            PosterSource::Url("https://image.tmdb.org/t/p/original/a.jpg".to_string())
        );
        assert_eq!(
            PosterSource::parse("./posters/bbc-earth.jpg"),
            PosterSource::File(PathBuf::from("./posters/bbc-earth.jpg"))
        );
        assert_eq!(
            PosterSource::parse("httpposter.jpg"),
            PosterSource::File(PathBuf::from("httpposter.jpg"))
        );
    }

    #[test]
    fn test_locked_field_lookup() {
        let mut collection = Collection::new("42", "Alien");
        collection.summary = Some("In space".to_string());
        collection.locked_fields = vec!["summary".to_string()];
        assert!(collection.is_locked(CollectionField::Summary));
        assert!(!collection.is_locked(CollectionField::TitleSort));
        assert_eq!(collection.field(CollectionField::Summary), Some("In space"));
    }

    #[test]
    fn test_mode_and_sort_names() {
        let mode: CollectionMode = serde_yaml::from_str("hideItems").unwrap();
        assert_eq!(mode, CollectionMode::HideItems);
        let sort: CollectionSort = serde_yaml::from_str("alpha").unwrap();
        assert_eq!(sort, CollectionSort::Alpha);
        assert!(serde_yaml::from_str::<CollectionSort>("random").is_err());
    }
}
