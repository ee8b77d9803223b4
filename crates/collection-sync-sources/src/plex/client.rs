use async_trait::async_trait;
use collection_sync_config::ServerSettings;
use collection_sync_models::{
    Collection, CollectionField, CollectionMode, CollectionSort, LibraryKind, MediaItem, PosterSource,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::PlexError;
use crate::plex::api::{LibraryInfo, PlexHttpClient};
use crate::plex::auth;
use crate::traits::{CollectionEditor, LibraryAccessor};

/// An authenticated connection to one server
pub struct PlexServer {
    client: Arc<PlexHttpClient>,
    machine_id: String,
}

impl PlexServer {
    pub async fn connect(settings: &ServerSettings) -> Result<Self, PlexError> {
        let (client, machine_id) = auth::authenticate(settings).await?;
        debug!("Plex: server machine identifier {}", machine_id);
        Ok(Self {
            client: Arc::new(client),
            machine_id,
        })
    }

    pub fn url(&self) -> &str {
        self.client.base_url()
    }

    pub async fn libraries(&self) -> Result<Vec<LibraryInfo>, PlexError> {
        self.client.sections().await
    }

    /// Open the library section called `name`. Only movie and show sections are accepted.
    pub async fn library(&self, name: &str) -> Result<PlexLibrary, PlexError> {
        let info = self
            .libraries()
            .await?
            .into_iter()
            .find(|lib| lib.title == name)
            .ok_or_else(|| PlexError::NotFound(format!("library \"{}\"", name)))?;

        let kind: LibraryKind = info.type_.parse().map_err(|_| PlexError::UnsupportedLibrary {
            name: name.to_string(),
            kind: info.type_.clone(),
        })?;

        Ok(PlexLibrary {
            client: Arc::clone(&self.client),
            machine_id: self.machine_id.clone(),
            key: info.key,
            name: info.title,
            kind,
            items_cache: Arc::new(RwLock::new(None)),
        })
    }
}

/// One library section. Items are fetched once per run and reused for
/// identifier lookups.
pub struct PlexLibrary {
    client: Arc<PlexHttpClient>,
    machine_id: String,
    key: String,
    name: String,
    kind: LibraryKind,
    items_cache: Arc<RwLock<Option<Vec<MediaItem>>>>,
}

impl PlexLibrary {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// `server://` URI naming a set of items, as expected by collection endpoints
    fn items_uri(&self, items: &[MediaItem]) -> String {
        items_uri(&self.machine_id, items)
    }

    async fn cached_items(&self) -> Result<Vec<MediaItem>, PlexError> {
        {
            let cached = self.items_cache.read().await;
            if let Some(ref items) = *cached {
                return Ok(items.clone());
            }
        }

        let items = self.client.section_items(&self.key, self.kind, None).await?;
        debug!("Plex: cached {} items of library \"{}\"", items.len(), self.name);

        let mut cached = self.items_cache.write().await;
        *cached = Some(items.clone());
        Ok(items)
    }
}

pub(crate) fn items_uri(machine_id: &str, items: &[MediaItem]) -> String {
    let keys: Vec<&str> = items.iter().map(|item| item.rating_key.as_str()).collect();
    format!(
        "server://{}/com.plexapp.plugins.library/library/metadata/{}",
        machine_id,
        keys.join(",")
    )
}

#[async_trait]
impl LibraryAccessor for PlexLibrary {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> LibraryKind {
        self.kind
    }

    async fn search(&self, title: &str) -> Result<Vec<MediaItem>, PlexError> {
        self.client.section_items(&self.key, self.kind, Some(title)).await
    }

    async fn get_by_guid(&self, guid: &str) -> Result<MediaItem, PlexError> {
        self.cached_items()
            .await?
            .into_iter()
            .find(|item| item.has_guid(guid))
            .ok_or_else(|| PlexError::NotFound(format!("item with guid {}", guid)))
    }

    async fn all_items(&self) -> Result<Vec<MediaItem>, PlexError> {
        self.cached_items().await
    }

    async fn collection(&self, title: &str) -> Result<Collection, PlexError> {
        let wanted = title.to_lowercase();
        let listed = self
            .client
            .section_collections(&self.key)
            .await?
            .into_iter()
            .find(|collection| collection.title.to_lowercase() == wanted)
            .ok_or_else(|| PlexError::NotFound(format!("collection \"{}\"", title)))?;

        self.client.collection_metadata(&listed.rating_key).await
    }

    async fn collections(&self) -> Result<Vec<Collection>, PlexError> {
        let listed = self.client.section_collections(&self.key).await?;
        let mut collections = Vec::with_capacity(listed.len());
        for collection in listed {
            collections.push(self.client.collection_metadata(&collection.rating_key).await?);
        }
        Ok(collections)
    }

    async fn collection_items(&self, collection: &Collection) -> Result<Vec<MediaItem>, PlexError> {
        self.client.collection_children(&collection.rating_key).await
    }
}

#[async_trait]
impl CollectionEditor for PlexLibrary {
    async fn create_collection(&self, title: &str, items: &[MediaItem]) -> Result<Collection, PlexError> {
        let uri = self.items_uri(items);
        let collection = self.client.create_collection(&self.key, self.kind, title, &uri).await?;
        info!("Created collection \"{}\" with {} items", title, items.len());
        Ok(collection)
    }

    async fn add_items(&self, collection: &Collection, items: &[MediaItem]) -> Result<(), PlexError> {
        let uri = self.items_uri(items);
        self.client.add_collection_items(&collection.rating_key, &uri).await?;
        info!("Added {} items to \"{}\"", items.len(), collection.title);
        Ok(())
    }

    async fn remove_items(&self, collection: &Collection, items: &[MediaItem]) -> Result<usize, PlexError> {
        // One request per item; a failure does not stop the rest
        let mut removed = 0;
        let mut last_error = None;
        for item in items {
            match self
                .client
                .remove_collection_item(&collection.rating_key, &item.rating_key)
                .await
            {
                Ok(()) => removed += 1,
                Err(e) => {
                    warn!("Failed to remove \"{}\" from \"{}\": {}", item.title, collection.title, e);
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if removed == 0 => Err(e),
            _ => {
                info!("Removed {} of {} items from \"{}\"", removed, items.len(), collection.title);
                Ok(removed)
            }
        }
    }

    async fn delete_collection(&self, collection: &Collection) -> Result<(), PlexError> {
        self.client.delete_metadata(&collection.rating_key).await?;
        info!("Deleted collection \"{}\"", collection.title);
        Ok(())
    }

    async fn edit_field(&self, collection: &Collection, field: CollectionField, value: &str) -> Result<(), PlexError> {
        let params = vec![
            (format!("{}.value", field.name()), value.to_string()),
            (format!("{}.locked", field.name()), "1".to_string()),
        ];
        self.client
            .edit_collection(&self.key, &collection.rating_key, &params)
            .await?;
        debug!("Set {} of \"{}\"", field.name(), collection.title);
        Ok(())
    }

    async fn add_labels(&self, collection: &Collection, labels: &[String]) -> Result<(), PlexError> {
        // Indexed label edits replace the whole set, so current labels are resent
        let mut all = collection.labels.clone();
        all.extend(labels.iter().filter(|l| !collection.labels.contains(l)).cloned());

        let mut params: Vec<(String, String)> = all
            .into_iter()
            .enumerate()
            .map(|(i, label)| (format!("label[{}].tag.tag", i), label))
            .collect();
        params.push(("label.locked".to_string(), "1".to_string()));

        self.client
            .edit_collection(&self.key, &collection.rating_key, &params)
            .await?;
        info!("Added labels {:?} to \"{}\"", labels, collection.title);
        Ok(())
    }

    async fn remove_labels(&self, collection: &Collection, labels: &[String]) -> Result<(), PlexError> {
        let params = vec![
            ("label[].tag.tag-".to_string(), labels.join(",")),
            ("label.locked".to_string(), "1".to_string()),
        ];
        self.client
            .edit_collection(&self.key, &collection.rating_key, &params)
            .await?;
        info!("Removed labels {:?} from \"{}\"", labels, collection.title);
        Ok(())
    }

    async fn upload_poster(&self, collection: &Collection, poster: &PosterSource) -> Result<(), PlexError> {
        match poster {
            PosterSource::Url(url) => {
                self.client.upload_poster_url(&collection.rating_key, url).await?;
            }
            PosterSource::File(path) => {
                let data = tokio::fs::read(path).await.map_err(|source| PlexError::Io {
                    path: path.clone(),
                    source,
                })?;
                self.client.upload_poster_bytes(&collection.rating_key, data).await?;
            }
        }
        debug!("Uploaded poster for \"{}\"", collection.title);
        Ok(())
    }

    async fn set_mode(&self, collection: &Collection, mode: CollectionMode) -> Result<(), PlexError> {
        self.client
            .set_pref(&collection.rating_key, "collectionMode", mode.plex_value())
            .await
    }

    async fn set_sort(&self, collection: &Collection, sort: CollectionSort) -> Result<(), PlexError> {
        self.client
            .set_pref(&collection.rating_key, "collectionSort", sort.plex_value())
            .await
    }
}
