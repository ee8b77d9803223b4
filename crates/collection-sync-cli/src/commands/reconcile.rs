use super::progress_ui::ReconcileUI;
use super::setup::Session;
use crate::output::Output;
use collection_sync_config::LibraryCollections;
use collection_sync_core::{CollectionReport, Reconciler};
use tracing::warn;

/// Create and edit the configured collections of every library, one library
/// after the other
pub async fn run_reconcile(session: &Session, output: &Output) -> Vec<CollectionReport> {
    let ui = ReconcileUI::new(output.is_quiet() || !output.is_human());
    let mut reports = Vec::new();

    for (name, library) in &session.libraries {
        let files = session
            .config
            .libraries
            .get(name)
            .map(|lib| lib.collection_files.as_slice())
            .unwrap_or_default();
        let collections = LibraryCollections::load(name, files);

        if collections.is_empty() {
            warn!(library = %name, "No collections declared");
            output.warn(format!("No collections declared for library \"{}\"", name));
            continue;
        }

        let pb = ui.add_library(name, collections.len());
        let library_reports = Reconciler::new(library)
            .run(&collections, |report| ui.collection_done(&pb, report))
            .await;
        ui.finish_library(&pb, name);

        reports.extend(library_reports);
    }

    reports
}
