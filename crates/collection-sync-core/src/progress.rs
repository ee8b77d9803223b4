use std::collections::HashMap;
use tracing::{info, warn};

use crate::reconcile::CollectionOutcome;

/// Tally of collection outcomes for one library run.
/// Provides periodic progress lines and a final summary.
pub struct ProgressTracker {
    total: usize,
    created: usize,
    updated: usize,
    deleted: usize,
    skipped: usize,
    abandoned: usize,
    failed: usize,
    start_time: std::time::Instant,
    progress_interval: usize,
    last_progress_log: usize,
    error_counts: HashMap<String, usize>,
}

impl ProgressTracker {
    /// `progress_interval`: log a progress line every N collections
    pub fn new(total: usize, progress_interval: usize) -> Self {
        Self {
            total,
            created: 0,
            updated: 0,
            deleted: 0,
            skipped: 0,
            abandoned: 0,
            failed: 0,
            start_time: std::time::Instant::now(),
            progress_interval: progress_interval.max(1),
            last_progress_log: 0,
            error_counts: HashMap::new(),
        }
    }

    pub fn record(&mut self, outcome: &CollectionOutcome) {
        match outcome {
            CollectionOutcome::Created { .. } => self.created += 1,
            CollectionOutcome::Updated { .. } => self.updated += 1,
            CollectionOutcome::Deleted => self.deleted += 1,
            CollectionOutcome::SkippedSmart => self.skipped += 1,
            CollectionOutcome::Abandoned { reason } => {
                self.abandoned += 1;
                *self.error_counts.entry(reason.clone()).or_insert(0) += 1;
            }
            CollectionOutcome::Failed { .. } => {
                self.failed += 1;
                *self.error_counts.entry("server error".to_string()).or_insert(0) += 1;
            }
        }
    }

    pub fn processed(&self) -> usize {
        self.created + self.updated + self.deleted + self.skipped + self.abandoned + self.failed
    }

    /// Log progress if the interval has been reached
    pub fn log_progress(&mut self) {
        let current = self.processed();
        if current - self.last_progress_log >= self.progress_interval && current < self.total {
            info!(
                "Progress: {}/{} collections | Created: {} | Updated: {} | Deleted: {} | Failed: {}",
                current, self.total, self.created, self.updated, self.deleted, self.failed
            );
            self.last_progress_log = current;
        }
    }

    pub fn log_summary(&self, library: &str) {
        let elapsed = self.start_time.elapsed();
        let summary = format!(
            "Library \"{}\": {} collections in {:.1}s | Created: {} | Updated: {} | Deleted: {} | Smart skipped: {} | Abandoned: {} | Failed: {}",
            library,
            self.total,
            elapsed.as_secs_f64(),
            self.created,
            self.updated,
            self.deleted,
            self.skipped,
            self.abandoned,
            self.failed
        );

        if self.failed > 0 || self.abandoned > 0 {
            warn!("{}", summary);

            let mut error_entries: Vec<_> = self.error_counts.iter().collect();
            error_entries.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
            let error_summary: Vec<String> = error_entries
                .iter()
                .map(|(category, count)| format!("{}: {}", category, count))
                .collect();
            info!("Problem breakdown: {}", error_summary.join(", "));
        } else {
            info!("{}", summary);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_counts_outcomes() {
        let mut tracker = ProgressTracker::new(4, 10);
        tracker.record(&CollectionOutcome::Created { items: 3, errors: 0 });
        tracker.record(&CollectionOutcome::Deleted);
        tracker.record(&CollectionOutcome::Abandoned {
            reason: "no items configured".to_string(),
        });
        tracker.record(&CollectionOutcome::SkippedSmart);

        assert_eq!(tracker.processed(), 4);
        assert_eq!(tracker.created, 1);
        assert_eq!(tracker.abandoned, 1);
        assert_eq!(tracker.error_counts.get("no items configured"), Some(&1));
    }
}
