//! Cleanup eligibility and the per-pass report.

use std::path::PathBuf;

use serde::Serialize;

use crate::core::types::{CleanupStatus, Outcome};

/// Decide whether a transient resource is deleted at the end of a run.
///
/// Rollback and release delete everything. Normal completion only deletes
/// resources whose transience flag is still set.
pub fn should_clean(outcome: Outcome, transient: bool) -> bool {
    match outcome {
        Outcome::RolledBack | Outcome::Released => true,
        Outcome::Completed => transient,
    }
}

/// A cleanup that failed for a reason other than a missing file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanupFailure {
    pub path: PathBuf,
    pub message: String,
}

/// Result of one cleanup pass over a collection's transient tasks.
///
/// Lists keep registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    /// Files deleted by this pass.
    pub removed: Vec<PathBuf>,
    /// Files that were already gone, or tasks already cleaned.
    pub already_clean: Vec<PathBuf>,
    /// Non-transient files left in place on normal completion.
    pub retained: Vec<PathBuf>,
    pub failures: Vec<CleanupFailure>,
}

impl CleanupReport {
    pub fn record(&mut self, path: PathBuf, status: CleanupStatus) {
        match status {
            CleanupStatus::Removed => self.removed.push(path),
            CleanupStatus::Absent | CleanupStatus::AlreadyCleaned => {
                self.already_clean.push(path);
            }
        }
    }

    pub fn retain(&mut self, path: PathBuf) {
        self.retained.push(path);
    }

    pub fn fail(&mut self, path: PathBuf, message: String) {
        self.failures.push(CleanupFailure { path, message });
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rollback_cleans_regardless_of_flag() {
        assert!(should_clean(Outcome::RolledBack, true));
        assert!(should_clean(Outcome::RolledBack, false));
        assert!(should_clean(Outcome::Released, false));
    }

    #[test]
    fn completion_respects_flag() {
        assert!(should_clean(Outcome::Completed, true));
        assert!(!should_clean(Outcome::Completed, false));
    }

    #[test]
    fn report_buckets_statuses() {
        let mut report = CleanupReport::default();
        report.record(PathBuf::from("/a"), CleanupStatus::Removed);
        report.record(PathBuf::from("/b"), CleanupStatus::Absent);
        report.record(PathBuf::from("/c"), CleanupStatus::AlreadyCleaned);
        report.retain(PathBuf::from("/d"));

        assert_eq!(report.removed, vec![PathBuf::from("/a")]);
        assert_eq!(
            report.already_clean,
            vec![PathBuf::from("/b"), PathBuf::from("/c")]
        );
        assert_eq!(report.retained, vec![PathBuf::from("/d")]);
        assert!(report.is_clean());

        report.fail(PathBuf::from("/e"), "permission denied".to_string());
        assert!(!report.is_clean());
    }
}
