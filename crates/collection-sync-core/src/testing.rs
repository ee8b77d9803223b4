// In-memory library used by the reconciler and dump tests. Every mutation is
// recorded so tests can assert on the exact calls issued.

use async_trait::async_trait;
use collection_sync_models::{
    Collection, CollectionField, CollectionMode, CollectionSort, LibraryKind, MediaItem, PosterSource,
};
use collection_sync_sources::{CollectionEditor, LibraryAccessor, PlexError};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Create { title: String, items: Vec<String> },
    Add { title: String, items: Vec<String> },
    Remove { title: String, items: Vec<String> },
    Delete { title: String },
    EditField { title: String, field: CollectionField, value: String },
    AddLabels { title: String, labels: Vec<String> },
    RemoveLabels { title: String, labels: Vec<String> },
    Poster { title: String, poster: PosterSource },
    Mode { title: String, mode: CollectionMode },
    Sort { title: String, sort: CollectionSort },
}

impl Call {
    pub fn is_membership_change(&self) -> bool {
        matches!(
            self,
            Call::Create { .. } | Call::Add { .. } | Call::Remove { .. } | Call::Delete { .. }
        )
    }
}

pub fn movie(rating_key: &str, title: &str, guids: &[&str]) -> MediaItem {
    MediaItem::new(rating_key, format!("plex://movie/m{}", rating_key), title).with_guids(guids.iter().copied())
}

pub struct FakeLibrary {
    kind: LibraryKind,
    items: Vec<MediaItem>,
    collections: Mutex<Vec<(Collection, Vec<MediaItem>)>>,
    calls: Mutex<Vec<Call>>,
    failing: Vec<&'static str>,
    partial_removals: bool,
}

impl FakeLibrary {
    pub fn new(kind: LibraryKind, items: Vec<MediaItem>) -> Self {
        Self {
            kind,
            items,
            collections: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            failing: Vec::new(),
            partial_removals: false,
        }
    }

    /// Movie library with a fixed set of items (rating keys 1 to 6)
    pub fn movies() -> Self {
        Self::new(
            LibraryKind::Movie,
            vec![
                movie("1", "The Matrix", &["imdb://tt0133093", "tmdb://603"]),
                movie("2", "The Matrix Reloaded", &["imdb://tt0234215", "tmdb://604"]),
                movie("3", "Heat", &["imdb://tt0113277", "tmdb://949"]),
                movie("4", "Alien", &["imdb://tt0078748", "tmdb://348"]),
                movie("5", "Aliens", &["imdb://tt0090605", "tmdb://679"]),
                MediaItem::new("6", "", "Home Video"),
            ],
        )
    }

    pub fn with_collection(self, collection: Collection, member_keys: &[&str]) -> Self {
        let members = self
            .items
            .iter()
            .filter(|item| member_keys.contains(&item.rating_key.as_str()))
            .cloned()
            .collect();
        self.collections.lock().unwrap().push((collection, members));
        self
    }

    /// Make every call of the named trait method fail after being recorded
    pub fn failing_on(mut self, method: &'static str) -> Self {
        self.failing.push(method);
        self
    }

    /// Removals succeed for every item but the first
    pub fn removing_partially(mut self) -> Self {
        self.partial_removals = true;
        self
    }

    fn check(&self, method: &str) -> Result<(), PlexError> {
        if self.failing.iter().any(|m| *m == method) {
            Err(PlexError::Parse(format!("{} response", method)))
        } else {
            Ok(())
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

fn keys(items: &[MediaItem]) -> Vec<String> {
    items.iter().map(|item| item.rating_key.clone()).collect()
}

#[async_trait]
impl LibraryAccessor for FakeLibrary {
    fn name(&self) -> &str {
        "Movies"
    }

    fn kind(&self) -> LibraryKind {
        self.kind
    }

    async fn search(&self, title: &str) -> Result<Vec<MediaItem>, PlexError> {
        // Substring match, like the server
        let wanted = title.to_lowercase();
        Ok(self
            .items
            .iter()
            .filter(|item| item.title.to_lowercase().contains(&wanted))
            .cloned()
            .collect())
    }

    async fn get_by_guid(&self, guid: &str) -> Result<MediaItem, PlexError> {
        self.items
            .iter()
            .find(|item| item.has_guid(guid))
            .cloned()
            .ok_or_else(|| PlexError::NotFound(guid.to_string()))
    }

    async fn all_items(&self) -> Result<Vec<MediaItem>, PlexError> {
        Ok(self.items.clone())
    }

    async fn collection(&self, title: &str) -> Result<Collection, PlexError> {
        self.collections
            .lock()
            .unwrap()
            .iter()
            .find(|(collection, _)| collection.title == title)
            .map(|(collection, _)| collection.clone())
            .ok_or_else(|| PlexError::NotFound(title.to_string()))
    }

    async fn collections(&self) -> Result<Vec<Collection>, PlexError> {
        Ok(self
            .collections
            .lock()
            .unwrap()
            .iter()
            .map(|(collection, _)| collection.clone())
            .collect())
    }

    async fn collection_items(&self, collection: &Collection) -> Result<Vec<MediaItem>, PlexError> {
        self.check("collection_items")?;
        self.collections
            .lock()
            .unwrap()
            .iter()
            .find(|(c, _)| c.rating_key == collection.rating_key)
            .map(|(_, members)| members.clone())
            .ok_or_else(|| PlexError::NotFound(collection.title.clone()))
    }
}

#[async_trait]
impl CollectionEditor for FakeLibrary {
    async fn create_collection(&self, title: &str, items: &[MediaItem]) -> Result<Collection, PlexError> {
        self.record(Call::Create {
            title: title.to_string(),
            items: keys(items),
        });
        let mut collections = self.collections.lock().unwrap();
        let collection = Collection::new(format!("c{}", collections.len() + 1), title);
        collections.push((collection.clone(), items.to_vec()));
        Ok(collection)
    }

    async fn add_items(&self, collection: &Collection, items: &[MediaItem]) -> Result<(), PlexError> {
        self.record(Call::Add {
            title: collection.title.clone(),
            items: keys(items),
        });
        self.check("add_items")
    }

    async fn remove_items(&self, collection: &Collection, items: &[MediaItem]) -> Result<usize, PlexError> {
        self.record(Call::Remove {
            title: collection.title.clone(),
            items: keys(items),
        });
        self.check("remove_items")?;
        if self.partial_removals {
            return Ok(items.len().saturating_sub(1));
        }
        Ok(items.len())
    }

    async fn delete_collection(&self, collection: &Collection) -> Result<(), PlexError> {
        self.record(Call::Delete {
            title: collection.title.clone(),
        });
        Ok(())
    }

    async fn edit_field(&self, collection: &Collection, field: CollectionField, value: &str) -> Result<(), PlexError> {
        self.record(Call::EditField {
            title: collection.title.clone(),
            field,
            value: value.to_string(),
        });
        self.check("edit_field")
    }

    async fn add_labels(&self, collection: &Collection, labels: &[String]) -> Result<(), PlexError> {
        self.record(Call::AddLabels {
            title: collection.title.clone(),
            labels: labels.to_vec(),
        });
        self.check("add_labels")
    }

    async fn remove_labels(&self, collection: &Collection, labels: &[String]) -> Result<(), PlexError> {
        self.record(Call::RemoveLabels {
            title: collection.title.clone(),
            labels: labels.to_vec(),
        });
        self.check("remove_labels")
    }

    async fn upload_poster(&self, collection: &Collection, poster: &PosterSource) -> Result<(), PlexError> {
        self.record(Call::Poster {
            title: collection.title.clone(),
            poster: poster.clone(),
        });
        self.check("upload_poster")
    }

    async fn set_mode(&self, collection: &Collection, mode: CollectionMode) -> Result<(), PlexError> {
        self.record(Call::Mode {
            title: collection.title.clone(),
            mode,
        });
        Ok(())
    }

    async fn set_sort(&self, collection: &Collection, sort: CollectionSort) -> Result<(), PlexError> {
        self.record(Call::Sort {
            title: collection.title.clone(),
            sort,
        });
        Ok(())
    }
}
