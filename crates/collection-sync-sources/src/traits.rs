use async_trait::async_trait;
use collection_sync_models::{
    Collection, CollectionField, CollectionMode, CollectionSort, LibraryKind, MediaItem, PosterSource,
};

use crate::error::PlexError;

/// Read and search access to a single library section
#[async_trait]
pub trait LibraryAccessor: Send + Sync {
    fn name(&self) -> &str;
    fn kind(&self) -> LibraryKind;

    /// Items whose title matches `title` according to the server's search
    async fn search(&self, title: &str) -> Result<Vec<MediaItem>, PlexError>;

    /// Item carrying `guid` (full form, e.g. `tmdb://603`) as native or external identifier.
    /// Returns `PlexError::NotFound` when no item matches.
    async fn get_by_guid(&self, guid: &str) -> Result<MediaItem, PlexError>;

    async fn all_items(&self) -> Result<Vec<MediaItem>, PlexError>;

    /// Collection with this title. Returns `PlexError::NotFound` when there is none.
    async fn collection(&self, title: &str) -> Result<Collection, PlexError>;

    async fn collections(&self) -> Result<Vec<Collection>, PlexError>;

    async fn collection_items(&self, collection: &Collection) -> Result<Vec<MediaItem>, PlexError>;
}

/// Mutations the reconciler issues against collections
#[async_trait]
pub trait CollectionEditor: LibraryAccessor {
    async fn create_collection(&self, title: &str, items: &[MediaItem]) -> Result<Collection, PlexError>;
    async fn add_items(&self, collection: &Collection, items: &[MediaItem]) -> Result<(), PlexError>;
    /// Returns how many items were removed. Errors only when none could be.
    async fn remove_items(&self, collection: &Collection, items: &[MediaItem]) -> Result<usize, PlexError>;
    async fn delete_collection(&self, collection: &Collection) -> Result<(), PlexError>;

    /// Set and lock a scalar field
    async fn edit_field(&self, collection: &Collection, field: CollectionField, value: &str) -> Result<(), PlexError>;

    async fn add_labels(&self, collection: &Collection, labels: &[String]) -> Result<(), PlexError>;
    async fn remove_labels(&self, collection: &Collection, labels: &[String]) -> Result<(), PlexError>;
    async fn upload_poster(&self, collection: &Collection, poster: &PosterSource) -> Result<(), PlexError>;
    async fn set_mode(&self, collection: &Collection, mode: CollectionMode) -> Result<(), PlexError>;
    async fn set_sort(&self, collection: &Collection, sort: CollectionSort) -> Result<(), PlexError>;
}
