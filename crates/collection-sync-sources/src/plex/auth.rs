use collection_sync_config::ServerSettings;
use tracing::{info, warn};

use crate::error::PlexError;
use crate::plex::api::PlexHttpClient;

/// Verify the token against the server at `url` and return the client and
/// the server's machine identifier
pub async fn verify_token(token: &str, url: &str) -> Result<(PlexHttpClient, String), PlexError> {
    let client = PlexHttpClient::new(token, url)?;
    let machine_id = client.identity().await?;
    Ok((client, machine_id))
}

/// Connect to the primary address, falling back to the public address when the
/// primary one cannot be reached. A rejected token is never retried.
pub async fn authenticate(settings: &ServerSettings) -> Result<(PlexHttpClient, String), PlexError> {
    match verify_token(&settings.token, &settings.primary_url).await {
        Ok(connected) => {
            info!("Connected to Plex at {}", settings.primary_url);
            Ok(connected)
        }
        Err(e) if e.is_connection() => match settings.fallback_url {
            Some(ref fallback) => {
                warn!(
                    "Could not reach {} ({}), retrying with public address {}",
                    settings.primary_url, e, fallback
                );
                let connected = verify_token(&settings.token, fallback).await?;
                info!("Connected to Plex at {}", fallback);
                Ok(connected)
            }
            None => Err(e),
        },
        Err(e) => Err(e),
    }
}
