pub mod collections;
pub mod config;
pub mod credentials;
pub mod paths;

pub use collections::{CollectionEntry, CollectionFileError, CollectionsFile, LibraryCollections};
pub use config::{AppConfig, CollectionFileRef, DumpConfig, LibraryConfig};
pub use credentials::{CredentialStore, ServerSettings, SettingsError, PUBLIC_SERVER_VAR, SERVER_VAR, TOKEN_VAR};
pub use paths::PathManager;
