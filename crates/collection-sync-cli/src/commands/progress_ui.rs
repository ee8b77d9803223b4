use collection_sync_core::CollectionReport;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::IsTerminal;

const BAR_TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}";

/// One progress bar per library while collections are reconciled. Without a
/// terminal the bars stay hidden and progress is logged instead.
pub struct ReconcileUI {
    multi: MultiProgress,
    interactive: bool,
}

impl ReconcileUI {
    pub fn new(quiet: bool) -> Self {
        let interactive = is_interactive() && !quiet;
        let multi = MultiProgress::new();

        if !interactive {
            multi.set_draw_target(ProgressDrawTarget::hidden());
            tracing::debug!(
                operation = "ui_init",
                mode = "non_interactive",
                "Progress bars disabled, using structured logging"
            );
        }

        Self { multi, interactive }
    }

    pub fn add_library(&self, name: &str, total: usize) -> ProgressBar {
        let pb = self.multi.add(ProgressBar::new(total as u64));
        pb.set_style(
            ProgressStyle::default_bar()
                .template(BAR_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▉▊▋▌▍▎▏  "),
        );
        pb.set_message(name.to_string());
        pb
    }

    pub fn collection_done(&self, pb: &ProgressBar, report: &CollectionReport) {
        pb.inc(1);
        if self.interactive {
            pb.set_message(format!("{}: {}", report.library, report.title));
        } else {
            tracing::info!(
                operation = "progress",
                library = %report.library,
                collection = %report.title,
                outcome = report.outcome.label(),
                current = pb.position(),
                total = pb.length().unwrap_or_default(),
                "Collection reconciled"
            );
        }
    }

    pub fn finish_library(&self, pb: &ProgressBar, name: &str) {
        if self.interactive {
            pb.finish_with_message(format!("{}: done", name));
        }
    }
}

pub fn is_interactive() -> bool {
    std::io::stdout().is_terminal() && std::io::stderr().is_terminal()
}
