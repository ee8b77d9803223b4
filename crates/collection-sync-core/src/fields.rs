use collection_sync_config::CollectionEntry;
use collection_sync_models::{Collection, CollectionField, CollectionMode, CollectionSort, PosterSource};
use collection_sync_sources::{CollectionEditor, PlexError};
use tracing::{debug, warn};

/// One configured attribute to write to a collection
#[derive(Debug, Clone, PartialEq)]
pub enum FieldUpdate {
    TitleSort(String),
    ContentRating(String),
    Summary(String),
    Labels(Vec<String>),
    Poster(PosterSource),
    Mode(CollectionMode),
    Sort(CollectionSort),
}

impl FieldUpdate {
    pub fn name(&self) -> &'static str {
        match self {
            FieldUpdate::TitleSort(_) => "titleSort",
            FieldUpdate::ContentRating(_) => "contentRating",
            FieldUpdate::Summary(_) => "summary",
            FieldUpdate::Labels(_) => "labels",
            FieldUpdate::Poster(_) => "poster",
            FieldUpdate::Mode(_) => "mode",
            FieldUpdate::Sort(_) => "sort",
        }
    }

    pub async fn apply<E>(&self, editor: &E, collection: &Collection) -> Result<(), PlexError>
    where
        E: CollectionEditor + ?Sized,
    {
        match self {
            FieldUpdate::TitleSort(value) => editor.edit_field(collection, CollectionField::TitleSort, value).await,
            FieldUpdate::ContentRating(value) => {
                editor.edit_field(collection, CollectionField::ContentRating, value).await
            }
            FieldUpdate::Summary(value) => editor.edit_field(collection, CollectionField::Summary, value).await,
            FieldUpdate::Labels(labels) => editor.add_labels(collection, labels).await,
            FieldUpdate::Poster(poster) => editor.upload_poster(collection, poster).await,
            FieldUpdate::Mode(mode) => editor.set_mode(collection, *mode).await,
            FieldUpdate::Sort(sort) => editor.set_sort(collection, *sort).await,
        }
    }
}

/// Present, non-empty fields of `entry` in application order:
/// titleSort, contentRating, summary, labels, poster, mode, sort
pub fn field_updates(entry: &CollectionEntry) -> Vec<FieldUpdate> {
    let mut updates = Vec::new();

    if let Some(value) = entry.title_sort() {
        updates.push(FieldUpdate::TitleSort(value.to_string()));
    }
    if let Some(value) = entry.content_rating() {
        updates.push(FieldUpdate::ContentRating(value.to_string()));
    }
    if let Some(value) = entry.summary() {
        updates.push(FieldUpdate::Summary(value.to_string()));
    }
    if let Some(labels) = entry.labels() {
        updates.push(FieldUpdate::Labels(labels.to_vec()));
    }
    if let Some(poster) = entry.poster() {
        updates.push(FieldUpdate::Poster(poster));
    }
    if let Some(mode) = entry.mode {
        updates.push(FieldUpdate::Mode(mode));
    }
    if let Some(sort) = entry.sort {
        updates.push(FieldUpdate::Sort(sort));
    }

    updates
}

/// Apply each update in order. Failures are logged and do not stop the
/// remaining updates; returns how many failed.
pub async fn apply_updates<E>(editor: &E, collection: &Collection, updates: &[FieldUpdate]) -> usize
where
    E: CollectionEditor + ?Sized,
{
    let mut failed = 0;
    for update in updates {
        match update.apply(editor, collection).await {
            Ok(()) => debug!("Applied {} to \"{}\"", update.name(), collection.title),
            Err(e) => {
                warn!("Failed to set {} of \"{}\": {}", update.name(), collection.title, e);
                failed += 1;
            }
        }
    }
    failed
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_field_updates_order() {
        let entry = CollectionEntry {
            sort: Some(CollectionSort::Alpha),
            mode: Some(CollectionMode::Hide),
            poster: Some("./posters/alien.jpg".to_string()),
            labels: Some(vec!["Horror".to_string()]),
            summary: Some("In space".to_string()),
            content_rating: Some("R".to_string()),
            title_sort: Some("Alien 1".to_string()),
            ..CollectionEntry::default()
        };

        let names: Vec<&str> = field_updates(&entry).iter().map(FieldUpdate::name).collect();
        assert_eq!(
            names,
            vec!["titleSort", "contentRating", "summary", "labels", "poster", "mode", "sort"]
        );
        assert_eq!(
            field_updates(&entry)[4],
            FieldUpdate::Poster(PosterSource::File(PathBuf::from("./posters/alien.jpg")))
        );
    }

    #[test]
    fn test_empty_values_are_skipped() {
        let entry = CollectionEntry {
            title_sort: Some(String::new()),
            labels: Some(vec![]),
            poster: Some(String::new()),
            ..CollectionEntry::default()
        };
        assert!(field_updates(&entry).is_empty());
    }
}
