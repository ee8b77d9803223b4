use anyhow::Context;
use collection_sync_config::{CollectionEntry, CollectionsFile, PathManager};
use collection_sync_models::{
    Collection, CollectionField, CollectionMode, CollectionSort, ExternalId, IdSource, ItemReference, LibraryKind,
    MediaItem,
};
use collection_sync_sources::{LibraryAccessor, PlexError};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Library contents as written by `--dump-library`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LibraryDump {
    /// One reference string per item
    Compact(Vec<String>),
    /// Reference string → fields the server reports for the item
    Full(BTreeMap<String, BTreeMap<String, serde_yaml::Value>>),
}

impl LibraryDump {
    pub fn len(&self) -> usize {
        match self {
            LibraryDump::Compact(items) => items.len(),
            LibraryDump::Full(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Reference string for `item`: the title followed by the preferred external
/// identifier token, the native `plex://` guid, or nothing.
pub fn item_reference(item: &MediaItem, kind: LibraryKind) -> ItemReference {
    let external: Vec<ExternalId> = item.guids.iter().filter_map(|g| ExternalId::from_guid(g)).collect();

    let id = IdSource::preference(kind)
        .iter()
        .filter(|source| **source != IdSource::Plex)
        .find_map(|source| external.iter().find(|id| id.source == *source))
        .cloned()
        .or_else(|| ExternalId::from_guid(&item.guid).filter(|id| id.source == IdSource::Plex));

    ItemReference::from_parts(&item.title, id.as_ref())
}

fn locked_value(collection: &Collection, field: CollectionField) -> Option<String> {
    if collection.is_locked(field) {
        collection.field(field).filter(|v| !v.is_empty()).map(str::to_string)
    } else {
        None
    }
}

/// Configuration entry that reproduces `collection` with `members`
pub fn collection_entry(collection: &Collection, members: &[MediaItem], kind: LibraryKind) -> CollectionEntry {
    CollectionEntry {
        items: Some(members.iter().map(|item| item_reference(item, kind)).collect()),
        labels: (!collection.labels.is_empty()).then(|| collection.labels.clone()),
        title_sort: locked_value(collection, CollectionField::TitleSort),
        content_rating: locked_value(collection, CollectionField::ContentRating),
        summary: locked_value(collection, CollectionField::Summary),
        poster: None,
        mode: collection.mode.filter(|mode| *mode != CollectionMode::Default),
        sort: collection.sort.filter(|sort| *sort != CollectionSort::Release),
    }
}

/// Every regular, non-empty collection of the library as a collection file
pub async fn dump_collections<L>(library: &L) -> Result<CollectionsFile, PlexError>
where
    L: LibraryAccessor + ?Sized,
{
    let mut file = CollectionsFile::default();

    for collection in library.collections().await? {
        if collection.smart {
            warn!("Not dumping smart collection \"{}\"", collection.title);
            continue;
        }
        let members = match library.collection_items(&collection).await {
            Ok(members) => members,
            Err(e) => {
                error!("Failed to list items of \"{}\", not dumping it: {}", collection.title, e);
                continue;
            }
        };
        // `items: []` would delete the collection when fed back in
        if members.is_empty() {
            warn!("Not dumping empty collection \"{}\"", collection.title);
            continue;
        }
        debug!("Dumping \"{}\" ({} items)", collection.title, members.len());
        let entry = collection_entry(&collection, &members, library.kind());
        file.collections.insert(collection.title.clone(), entry);
    }

    info!(
        "Dumped {} collections of library \"{}\"",
        file.collections.len(),
        library.name()
    );
    Ok(file)
}

fn item_fields(item: &MediaItem) -> BTreeMap<String, serde_yaml::Value> {
    let mut fields = BTreeMap::new();
    if let Ok(serde_yaml::Value::Mapping(mapping)) = serde_yaml::to_value(item) {
        for (key, value) in mapping {
            if is_blank(&value) {
                continue;
            }
            if let Some(key) = key.as_str() {
                fields.insert(key.to_string(), value);
            }
        }
    }
    fields
}

fn is_blank(value: &serde_yaml::Value) -> bool {
    match value {
        serde_yaml::Value::Null => true,
        serde_yaml::Value::String(s) => s.is_empty(),
        serde_yaml::Value::Sequence(seq) => seq.is_empty(),
        _ => false,
    }
}

/// All items of the library, as reference strings or with their full field map
pub async fn dump_library<L>(library: &L, full: bool) -> Result<LibraryDump, PlexError>
where
    L: LibraryAccessor + ?Sized,
{
    let kind = library.kind();
    let items = library.all_items().await?;

    let dump = if full {
        let mut map = BTreeMap::new();
        for item in &items {
            let reference = item_reference(item, kind).raw;
            if map.insert(reference.clone(), item_fields(item)).is_some() {
                warn!("Duplicate reference \"{}\" in library dump, keeping the last item", reference);
            }
        }
        LibraryDump::Full(map)
    } else {
        LibraryDump::Compact(items.iter().map(|item| item_reference(item, kind).raw).collect())
    };

    info!("Dumped {} items of library \"{}\"", dump.len(), library.name());
    Ok(dump)
}

/// Write `value` as YAML to `<dir>/<library name>.yml`
pub fn write_dump<T>(dir: &Path, library_name: &str, value: &T) -> anyhow::Result<PathBuf>
where
    T: Serialize + ?Sized,
{
    std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let path = PathManager::dump_file(dir, library_name);
    let content = serde_yaml::to_string(value).context("Failed to serialize dump")?;
    std::fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;

    info!("Wrote {}", path.display());
    Ok(path)
}
