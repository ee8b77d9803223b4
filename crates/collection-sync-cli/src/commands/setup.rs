use crate::output::Output;
use collection_sync_config::{AppConfig, CredentialStore, PathManager, ServerSettings, PUBLIC_SERVER_VAR, TOKEN_VAR};
use collection_sync_sources::{PlexError, PlexLibrary, PlexServer};
use color_eyre::eyre::{eyre, Result};
use std::path::Path;
use tracing::{info, warn};

/// Everything a run needs once the server is reachable and every configured
/// library has been opened
pub struct Session {
    pub config: AppConfig,
    /// Opened in config order, paired with their configured names
    pub libraries: Vec<(String, PlexLibrary)>,
}

pub fn load_config(path: &Path) -> Result<AppConfig> {
    let config = AppConfig::load_from_file(path)
        .map_err(|e| eyre!("{:#}. Please check the config file, and consult the README.", e))?;
    config
        .validate()
        .map_err(|e| eyre!("Invalid config file {}: {}", path.display(), e))?;
    Ok(config)
}

pub fn load_settings(paths: &PathManager) -> Result<ServerSettings> {
    let store = CredentialStore::load(&paths.credentials_file()).unwrap_or_else(|e| {
        warn!("Ignoring credentials file: {:#}", e);
        CredentialStore::default()
    });
    Ok(ServerSettings::resolve(&store)?)
}

fn connect_error(e: PlexError, settings: &ServerSettings) -> color_eyre::Report {
    match e {
        PlexError::Unauthorized => eyre!(
            "Invalid Plex token. Please check \"{}\", and consult the README.",
            TOKEN_VAR
        ),
        PlexError::InvalidUrl(url) => eyre!(
            "Invalid server address {:?}. Please check \"{}\", and consult the README.",
            url,
            settings.primary_var
        ),
        e if e.is_connection() => {
            let checked = match settings.fallback_url {
                Some(_) => format!("\"{}\" and \"{}\"", settings.primary_var, PUBLIC_SERVER_VAR),
                None => format!("\"{}\"", settings.primary_var),
            };
            eyre!(
                "Unable to connect to the Plex server ({}). Please check {}, and consult the README.",
                e,
                checked
            )
        }
        e => eyre!("Failed to connect to the Plex server: {}", e),
    }
}

fn library_error(name: &str, e: PlexError) -> color_eyre::Report {
    match e {
        PlexError::NotFound(_) => eyre!(
            "Library named \"{}\" not found. Please check the config file, and consult the README.",
            name
        ),
        e => eyre!("Failed to open library \"{}\": {}", name, e),
    }
}

/// Load configuration, connect to the server and open every configured
/// library. Any failure here ends the run.
pub async fn open_session(config_path: &Path, output: &Output) -> Result<Session> {
    let config = load_config(config_path)?;
    let paths = PathManager::default();
    let settings = load_settings(&paths)?;

    let server = PlexServer::connect(&settings)
        .await
        .map_err(|e| connect_error(e, &settings))?;
    output.success(format!("Connected to Plex server at {}", server.url()));

    let mut libraries = Vec::with_capacity(config.libraries.len());
    for name in config.library_names() {
        let library = server.library(name).await.map_err(|e| library_error(name, e))?;
        info!(library = name, key = library.key(), "Opened library");
        libraries.push((name.to_string(), library));
    }

    Ok(Session { config, libraries })
}
