pub mod error;
pub mod plex;
pub mod traits;

pub use error::PlexError;
pub use plex::{LibraryInfo, PlexHttpClient, PlexLibrary, PlexServer};
pub use traits::{CollectionEditor, LibraryAccessor};
