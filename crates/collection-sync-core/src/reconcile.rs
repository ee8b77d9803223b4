// Converges the collections of one library towards the declared state.
//
// Titles that do not exist yet are created first; existing collections are
// collected along the way and synced afterwards.

use collection_sync_config::{CollectionEntry, LibraryCollections};
use collection_sync_models::{Collection, ItemReference, LibraryKind, MediaItem};
use collection_sync_sources::CollectionEditor;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, error, info, warn};

use crate::fields::{apply_updates, field_updates, FieldUpdate};
use crate::progress::ProgressTracker;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CollectionOutcome {
    Created { items: usize, errors: usize },
    Updated { added: usize, removed: usize, errors: usize },
    Deleted,
    SkippedSmart,
    /// Nothing was created: no items configured or none could be found
    Abandoned { reason: String },
    Failed { error: String },
}

impl CollectionOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            CollectionOutcome::Created { .. } => "created",
            CollectionOutcome::Updated { .. } => "updated",
            CollectionOutcome::Deleted => "deleted",
            CollectionOutcome::SkippedSmart => "skipped (smart)",
            CollectionOutcome::Abandoned { .. } => "abandoned",
            CollectionOutcome::Failed { .. } => "failed",
        }
    }

    pub fn is_problem(&self) -> bool {
        match self {
            CollectionOutcome::Abandoned { .. } | CollectionOutcome::Failed { .. } => true,
            CollectionOutcome::Created { errors, .. } | CollectionOutcome::Updated { errors, .. } => *errors > 0,
            CollectionOutcome::Deleted | CollectionOutcome::SkippedSmart => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionReport {
    pub library: String,
    pub title: String,
    #[serde(flatten)]
    pub outcome: CollectionOutcome,
}

pub struct Reconciler<'a, L: ?Sized> {
    library: &'a L,
}

impl<'a, L> Reconciler<'a, L>
where
    L: CollectionEditor + ?Sized,
{
    pub fn new(library: &'a L) -> Self {
        Self { library }
    }

    /// Reconcile every configured collection, in title order. `on_collection`
    /// is called once per finished collection.
    pub async fn run<F>(&self, collections: &LibraryCollections, mut on_collection: F) -> Vec<CollectionReport>
    where
        F: FnMut(&CollectionReport),
    {
        let library_name = self.library.name().to_string();
        let mut tracker = ProgressTracker::new(collections.len(), 10);
        let mut reports = Vec::with_capacity(collections.len());
        let mut deferred = Vec::new();

        info!(
            "Reconciling {} collections in library \"{}\"",
            collections.len(),
            library_name
        );

        for (title, entry) in collections.iter() {
            let outcome = match self.library.collection(title).await {
                Ok(existing) => {
                    debug!("Collection \"{}\" exists, deferring to update", title);
                    deferred.push((title, entry, existing));
                    continue;
                }
                Err(e) if e.is_not_found() => self.create(title, entry).await,
                Err(e) => {
                    error!("Failed to look up collection \"{}\": {}", title, e);
                    CollectionOutcome::Failed { error: e.to_string() }
                }
            };
            let report = CollectionReport {
                library: library_name.clone(),
                title: title.clone(),
                outcome,
            };
            record(&mut reports, &mut tracker, &mut on_collection, report);
        }

        for (title, entry, existing) in deferred {
            let outcome = self.update(existing, entry).await;
            let report = CollectionReport {
                library: library_name.clone(),
                title: title.clone(),
                outcome,
            };
            record(&mut reports, &mut tracker, &mut on_collection, report);
        }

        tracker.log_summary(&library_name);
        reports
    }

    pub async fn create(&self, title: &str, entry: &CollectionEntry) -> CollectionOutcome {
        if !entry.has_items() {
            error!("Collection \"{}\" has no items configured, not creating it", title);
            return CollectionOutcome::Abandoned {
                reason: "no items configured".to_string(),
            };
        }

        let items = self.resolve_all(entry.items()).await;
        if items.is_empty() {
            error!(
                "None of the items of \"{}\" were found in library \"{}\", not creating it",
                title,
                self.library.name()
            );
            return CollectionOutcome::Abandoned {
                reason: "no items found".to_string(),
            };
        }

        let collection = match self.library.create_collection(title, &items).await {
            Ok(collection) => collection,
            Err(e) => {
                error!("Failed to create collection \"{}\": {}", title, e);
                return CollectionOutcome::Failed { error: e.to_string() };
            }
        };

        let errors = apply_updates(self.library, &collection, &field_updates(entry)).await;
        CollectionOutcome::Created {
            items: items.len(),
            errors,
        }
    }

    pub async fn update(&self, collection: Collection, entry: &CollectionEntry) -> CollectionOutcome {
        if collection.smart {
            warn!("Skipping smart collection \"{}\"", collection.title);
            return CollectionOutcome::SkippedSmart;
        }

        if !entry.has_items() {
            return match self.library.delete_collection(&collection).await {
                Ok(()) => {
                    warn!("Deleted collection \"{}\": no items configured", collection.title);
                    CollectionOutcome::Deleted
                }
                Err(e) => {
                    error!("Failed to delete collection \"{}\": {}", collection.title, e);
                    CollectionOutcome::Failed { error: e.to_string() }
                }
            };
        }

        let members = match self.library.collection_items(&collection).await {
            Ok(members) => members,
            Err(e) => {
                error!("Failed to list items of \"{}\": {}", collection.title, e);
                return CollectionOutcome::Failed { error: e.to_string() };
            }
        };

        let mut errors = 0;

        let mut to_add = self.resolve_all(additions(entry.items(), &members)).await;
        to_add.retain(|item| !members.iter().any(|m| m.rating_key == item.rating_key));
        let mut added = 0;
        if !to_add.is_empty() {
            match self.library.add_items(&collection, &to_add).await {
                Ok(()) => added = to_add.len(),
                Err(e) => {
                    warn!("Failed to add items to \"{}\": {}", collection.title, e);
                    errors += 1;
                }
            }
        }

        let to_remove = plan_removals(&members, entry.items(), self.library.kind());
        let mut removed = 0;
        if !to_remove.is_empty() {
            match self.library.remove_items(&collection, &to_remove).await {
                Ok(count) => {
                    removed = count;
                    if count < to_remove.len() {
                        warn!(
                            "Removed only {} of {} items from \"{}\"",
                            count,
                            to_remove.len(),
                            collection.title
                        );
                        errors += 1;
                    }
                }
                Err(e) => {
                    warn!("Failed to remove items from \"{}\": {}", collection.title, e);
                    errors += 1;
                }
            }
        }

        let updates: Vec<FieldUpdate> = field_updates(entry)
            .into_iter()
            .filter(|update| !matches!(update, FieldUpdate::Labels(_)))
            .collect();
        errors += apply_updates(self.library, &collection, &updates).await;
        errors += self.sync_labels(&collection, entry.labels.as_deref()).await;

        CollectionOutcome::Updated { added, removed, errors }
    }

    /// Present labels are made exact; an empty list clears all labels and an
    /// absent key leaves them alone. Returns the number of failed calls.
    async fn sync_labels(&self, collection: &Collection, configured: Option<&[String]>) -> usize {
        let Some(configured) = configured else {
            return 0;
        };

        let (add, remove) = label_diff(&collection.labels, configured);
        let mut errors = 0;

        if !add.is_empty() {
            if let Err(e) = self.library.add_labels(collection, &add).await {
                warn!("Failed to add labels to \"{}\": {}", collection.title, e);
                errors += 1;
            }
        }
        if !remove.is_empty() {
            if let Err(e) = self.library.remove_labels(collection, &remove).await {
                warn!("Failed to remove labels from \"{}\": {}", collection.title, e);
                errors += 1;
            }
        }

        errors
    }

    /// Find the library item a reference points at: by identifier first, then
    /// by exact title among the search results.
    pub async fn resolve(&self, reference: &ItemReference) -> Option<MediaItem> {
        if let Some(id) = reference.identifier(self.library.kind()) {
            let guid = id.full();
            match self.library.get_by_guid(&guid).await {
                Ok(item) => return Some(item),
                Err(e) if e.is_not_found() => debug!("No item with {}, searching by title", guid),
                Err(e) => warn!("Lookup of {} failed: {}", guid, e),
            }
        }

        match self.library.search(&reference.title).await {
            Ok(results) => {
                if let Some(item) = results.into_iter().find(|item| item.title == reference.title) {
                    return Some(item);
                }
            }
            Err(e) => warn!("Search for \"{}\" failed: {}", reference.title, e),
        }

        warn!(
            "Item \"{}\" not found in library \"{}\"",
            reference.raw,
            self.library.name()
        );
        None
    }

    async fn resolve_all<'r, I>(&self, references: I) -> Vec<MediaItem>
    where
        I: IntoIterator<Item = &'r ItemReference>,
    {
        let mut items: Vec<MediaItem> = Vec::new();
        for reference in references {
            if let Some(item) = self.resolve(reference).await {
                if !items.iter().any(|i| i.rating_key == item.rating_key) {
                    items.push(item);
                }
            }
        }
        items
    }
}

fn record<F>(
    reports: &mut Vec<CollectionReport>,
    tracker: &mut ProgressTracker,
    on_collection: &mut F,
    report: CollectionReport,
) where
    F: FnMut(&CollectionReport),
{
    tracker.record(&report.outcome);
    tracker.log_progress();
    on_collection(&report);
    reports.push(report);
}

/// References whose title matches no current member title
pub fn additions<'r>(references: &'r [ItemReference], members: &[MediaItem]) -> Vec<&'r ItemReference> {
    references
        .iter()
        .filter(|reference| !members.iter().any(|member| member.title == reference.title))
        .collect()
}

/// Members no configured reference accounts for.
///
/// A member stays when any of these holds:
/// - one of its external guids equals a reference's preferred identifier
/// - its non-empty native guid occurs inside a raw reference string
/// - its title equals a reference title
pub fn plan_removals(members: &[MediaItem], references: &[ItemReference], kind: LibraryKind) -> Vec<MediaItem> {
    let configured_ids: HashSet<String> = references
        .iter()
        .filter_map(|reference| reference.identifier(kind))
        .map(|id| id.full())
        .collect();

    members
        .iter()
        .filter(|member| !is_referenced(member, references, &configured_ids))
        .cloned()
        .collect()
}

fn is_referenced(member: &MediaItem, references: &[ItemReference], configured_ids: &HashSet<String>) -> bool {
    let by_external_id = member.guids.iter().any(|guid| configured_ids.contains(guid));
    let by_native_guid =
        !member.guid.is_empty() && references.iter().any(|reference| reference.raw.contains(&member.guid));
    let by_title = references.iter().any(|reference| reference.title == member.title);

    by_external_id || by_native_guid || by_title
}

/// Labels to add (configured, not current) and to remove (current, not configured)
pub fn label_diff(current: &[String], configured: &[String]) -> (Vec<String>, Vec<String>) {
    let mut add: Vec<String> = Vec::new();
    for label in configured {
        if !current.contains(label) && !add.contains(label) {
            add.push(label.clone());
        }
    }

    let remove = current
        .iter()
        .filter(|label| !configured.contains(label))
        .cloned()
        .collect();

    (add, remove)
}
