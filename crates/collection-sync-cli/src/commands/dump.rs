use super::setup::Session;
use crate::output::Output;
use collection_sync_core::{dump_collections, dump_library, write_dump};
use color_eyre::eyre::{eyre, Result};
use serde_json::json;
use std::path::PathBuf;
use tracing::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpKind {
    Collections,
    Library { all_fields: bool },
}

impl DumpKind {
    fn describe(&self) -> &'static str {
        match self {
            DumpKind::Collections => "collections",
            DumpKind::Library { .. } => "library",
        }
    }
}

/// Write one YAML file per library. A library that cannot be read is reported
/// and skipped; failing to write a file ends the run.
pub async fn run_dump(session: &Session, kind: DumpKind, output: &Output) -> Result<Vec<PathBuf>> {
    let dir = match kind {
        DumpKind::Collections => &session.config.dump.collections_dir,
        DumpKind::Library { .. } => &session.config.dump.library_dir,
    };
    let mut written = Vec::new();

    for (name, library) in &session.libraries {
        let path = match kind {
            DumpKind::Collections => match dump_collections(library).await {
                Ok(file) => write_dump(dir, name, &file),
                Err(e) => {
                    error!(library = %name, "Failed to dump collections: {}", e);
                    output.error(format!("Failed to dump collections of \"{}\": {}", name, e));
                    continue;
                }
            },
            DumpKind::Library { all_fields } => match dump_library(library, all_fields).await {
                Ok(items) => write_dump(dir, name, &items),
                Err(e) => {
                    error!(library = %name, "Failed to dump library: {}", e);
                    output.error(format!("Failed to dump library \"{}\": {}", name, e));
                    continue;
                }
            },
        }
        .map_err(|e| eyre!("{:#}", e))?;

        if output.is_human() {
            output.success(format!("Wrote {} dump of \"{}\" to {}", kind.describe(), name, path.display()));
        } else {
            output.json(&json!({
                "type": "dump",
                "kind": kind.describe(),
                "library": name,
                "path": path.display().to_string(),
            }));
        }
        written.push(path);
    }

    Ok(written)
}
