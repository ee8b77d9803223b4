pub mod api;
pub mod auth;
pub mod client;

#[cfg(test)]
pub(crate) mod test_server;

pub use api::{LibraryInfo, PlexHttpClient};
pub use client::{PlexLibrary, PlexServer};
