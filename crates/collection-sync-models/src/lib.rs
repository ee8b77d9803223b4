pub mod collection;
pub mod item_ref;
pub mod media;

pub use collection::{Collection, CollectionField, CollectionMode, CollectionSort, PosterSource};
pub use item_ref::{extract_identifier, strip_identifier, ExternalId, IdForm, IdSource, ItemReference};
pub use media::{LibraryKind, MediaItem, UnknownKind};
