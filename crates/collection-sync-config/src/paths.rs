use anyhow::Result;
use std::path::{Path, PathBuf};

/// Override for the directory holding `credentials.toml`
pub const CONFIG_DIR_VAR: &str = "PLEX_COLLECTIONS_CONFIG_DIR";

pub struct PathManager {
    config_dir: PathBuf,
}

impl PathManager {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
            .join("plex-collections");
        Ok(Self::with_base(base_dir))
    }

    pub fn with_base(base_dir: PathBuf) -> Self {
        Self { config_dir: base_dir }
    }

    pub fn credentials_file(&self) -> PathBuf {
        self.config_dir.join("credentials.toml")
    }

    /// `config.yml` is looked up in the working directory unless `--config` is given
    pub fn default_config_file() -> PathBuf {
        PathBuf::from("config.yml")
    }

    /// Dump file for a library: spaces in the name become underscores
    pub fn dump_file(dir: &Path, library_name: &str) -> PathBuf {
        dir.join(format!("{}.yml", library_name.replace(' ', "_")))
    }
}

impl Default for PathManager {
    fn default() -> Self {
        if let Ok(dir) = std::env::var(CONFIG_DIR_VAR) {
            return Self::with_base(PathBuf::from(dir));
        }
        Self::new().unwrap_or_else(|_| Self::with_base(PathBuf::from(".plex-collections")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dump_file_name() {
        let path = PathManager::dump_file(Path::new("dump/collections"), "TV Shows");
        assert_eq!(path, PathBuf::from("dump/collections/TV_Shows.yml"));
    }

    #[test]
    fn test_with_base_layout() {
        let paths = PathManager::with_base(PathBuf::from("/srv/pcm"));
        assert_eq!(paths.credentials_file(), PathBuf::from("/srv/pcm/credentials.toml"));
    }
}
