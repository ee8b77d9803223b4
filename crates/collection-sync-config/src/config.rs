use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Process configuration loaded from `config.yml`
#[derive(Debug, Serialize, Deserialize)]
pub struct AppConfig {
    /// Library name → the collection files declaring its collections
    pub libraries: BTreeMap<String, LibraryConfig>,
    #[serde(default)]
    pub dump: DumpConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LibraryConfig {
    #[serde(default)]
    pub collection_files: Vec<CollectionFileRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CollectionFileRef {
    pub file: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DumpConfig {
    #[serde(default = "default_collections_dump_dir")]
    pub collections_dir: PathBuf,
    #[serde(default = "default_library_dump_dir")]
    pub library_dir: PathBuf,
}

fn default_collections_dump_dir() -> PathBuf {
    PathBuf::from("dump").join("collections")
}

fn default_library_dump_dir() -> PathBuf {
    PathBuf::from("dump").join("libraries")
}

impl Default for DumpConfig {
    fn default() -> Self {
        Self {
            collections_dir: default_collections_dump_dir(),
            library_dir: default_library_dump_dir(),
        }
    }
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: AppConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.libraries.is_empty() {
            return Err(anyhow::anyhow!("No libraries configured under `libraries`"));
        }

        for (name, library) in &self.libraries {
            if name.trim().is_empty() {
                return Err(anyhow::anyhow!("Library names cannot be empty"));
            }
            if library.collection_files.is_empty() {
                return Err(anyhow::anyhow!(
                    "Library \"{}\" has no collection_files configured",
                    name
                ));
            }
        }

        Ok(())
    }

    pub fn library_names(&self) -> Vec<&str> {
        self.libraries.keys().map(String::as_str).collect()
    }
}
