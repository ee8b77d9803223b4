pub mod dump;
pub mod fields;
pub mod identifier;
pub mod progress;
pub mod reconcile;

#[cfg(test)]
pub(crate) mod testing;

pub use dump::{dump_collections, dump_library, write_dump, LibraryDump};
pub use fields::{field_updates, FieldUpdate};
pub use identifier::{extract_identifier, IdentifierError};
pub use progress::ProgressTracker;
pub use reconcile::{CollectionOutcome, CollectionReport, Reconciler};
