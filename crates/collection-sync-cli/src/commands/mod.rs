pub mod dump;
pub mod progress_ui;
pub mod reconcile;
pub mod setup;
pub mod summary;
