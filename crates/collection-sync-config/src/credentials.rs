use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

pub const TOKEN_VAR: &str = "PLEX_TOKEN";
pub const SERVER_VAR: &str = "PLEX_SERVER_IP";
pub const PUBLIC_SERVER_VAR: &str = "PLEX_SERVER_PUBLIC_IP";

#[derive(Debug, Deserialize, Default)]
struct CredentialsData {
    #[serde(flatten)]
    data: HashMap<String, String>,
}

/// Optional `credentials.toml` holding server settings for users who prefer
/// a file over environment variables. Keys are `plex_token`,
/// `plex_server_url` and `plex_public_url`.
#[derive(Debug, Default)]
pub struct CredentialStore {
    credentials: HashMap<String, String>,
}

impl CredentialStore {
    /// Read the store at `path`. A missing file gives an empty store.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let creds_data: CredentialsData =
            toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(Self {
            credentials: creds_data.data,
        })
    }

    pub fn get(&self, key: &str) -> Option<&String> {
        self.credentials.get(key)
    }

    /// Value stored for the setting an environment variable names
    fn get_for_var(&self, var: &str) -> Option<&String> {
        let key = match var {
            TOKEN_VAR => "plex_token",
            SERVER_VAR => "plex_server_url",
            PUBLIC_SERVER_VAR => "plex_public_url",
            _ => return None,
        };
        self.get(key)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Cannot find \"{TOKEN_VAR}\" in the environment or credentials file. Please consult the README.")]
    MissingToken,

    #[error("Cannot find a server address (\"{SERVER_VAR}\" or \"{PUBLIC_SERVER_VAR}\"). Please consult the README.")]
    MissingAddress,

    #[error("Invalid server address {value:?} in \"{var}\": it must start with http:// or https://")]
    MissingScheme { var: &'static str, value: String },
}

/// Where and how to reach the server for this run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub token: String,
    pub primary_url: String,
    /// Tried when the primary address cannot be reached
    pub fallback_url: Option<String>,
    /// Name of the variable the primary address came from, for error messages
    pub primary_var: &'static str,
}

impl ServerSettings {
    /// Environment first, then the credentials file
    pub fn resolve(store: &CredentialStore) -> Result<Self, SettingsError> {
        Self::from_lookup(|var| {
            std::env::var(var)
                .ok()
                .or_else(|| store.get_for_var(var).cloned())
        })
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |var: &str| lookup(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let token = value(TOKEN_VAR).ok_or(SettingsError::MissingToken)?;

        let (primary_var, primary_url, fallback_url) = match (value(SERVER_VAR), value(PUBLIC_SERVER_VAR)) {
            (Some(local), public) => (SERVER_VAR, local, public),
            (None, Some(public)) => (PUBLIC_SERVER_VAR, public, None),
            (None, None) => return Err(SettingsError::MissingAddress),
        };

        check_scheme(primary_var, &primary_url)?;
        if let Some(ref fallback) = fallback_url {
            check_scheme(PUBLIC_SERVER_VAR, fallback)?;
        }

        Ok(Self {
            token,
            primary_url: primary_url.trim_end_matches('/').to_string(),
            fallback_url: fallback_url.map(|url| url.trim_end_matches('/').to_string()),
            primary_var,
        })
    }
}

fn check_scheme(var: &'static str, url: &str) -> Result<(), SettingsError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(SettingsError::MissingScheme {
            var,
            value: url.to_string(),
        })
    }
}
