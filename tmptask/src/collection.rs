//! Ordered task collection with completion and rollback cleanup.
//!
//! Tasks run in registration order. The first failure stops the run, triggers
//! rollback tasks, and deletes every transient resource. A clean run triggers
//! completion tasks and deletes only resources still flagged transient.

use anyhow::{Result, bail};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::core::cleanup::{CleanupReport, should_clean};
use crate::core::types::{Outcome, ResourcePath};
use crate::task::{Task, Transient};

/// Summary of a successful [`Collection::run`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionReport {
    pub outcome: Outcome,
    pub tasks_run: usize,
    pub cleanup: CleanupReport,
}

#[derive(Default)]
pub struct Collection {
    tasks: Vec<Box<dyn Task>>,
    rollback_tasks: Vec<Box<dyn Task>>,
    completion_tasks: Vec<Box<dyn Task>>,
    started: bool,
    finished: Option<Outcome>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Outcome of the last completion or rollback, if any.
    pub fn outcome(&self) -> Option<Outcome> {
        self.finished
    }

    pub fn add(&mut self, task: impl Task + 'static) -> &mut Self {
        self.tasks.push(Box::new(task));
        self
    }

    /// Register a task that owns a transient resource and return its path.
    pub fn add_transient<T>(&mut self, task: T) -> ResourcePath
    where
        T: Task + Transient + 'static,
    {
        let path = task.path().clone();
        debug!(path = %path, "registered transient task");
        self.tasks.push(Box::new(task));
        path
    }

    /// Run `task` if the collection rolls back.
    pub fn add_rollback(&mut self, task: impl Task + 'static) -> &mut Self {
        self.rollback_tasks.push(Box::new(task));
        self
    }

    /// Run `task` after every task has succeeded.
    pub fn add_completion(&mut self, task: impl Task + 'static) -> &mut Self {
        self.completion_tasks.push(Box::new(task));
        self
    }

    /// Look up a registered transient task by its path.
    pub fn transient_mut(&mut self, path: &ResourcePath) -> Option<&mut dyn Transient> {
        self.tasks
            .iter_mut()
            .filter_map(|task| task.as_transient_mut())
            .find(|transient| transient.path() == path)
    }

    /// Run every task in order.
    ///
    /// On failure the collection rolls back before returning the task's error.
    /// Cleanup failures never mask the task error; they are logged.
    pub fn run(&mut self) -> Result<CollectionReport> {
        if self.started {
            bail!("collection has already run");
        }
        self.started = true;

        for index in 0..self.tasks.len() {
            let task = &mut self.tasks[index];
            let name = task.name();
            info!(task = %name, index, "running task");
            if let Err(err) = task.run() {
                warn!(task = %name, error = %format!("{err:#}"), "task failed, rolling back");
                let cleanup = self.rollback();
                return Err(err.context(format!(
                    "task {} ({name}) failed; rolled back with {} cleanup failure(s)",
                    index + 1,
                    cleanup.failures.len()
                )));
            }
        }

        let cleanup = self.complete();
        Ok(CollectionReport {
            outcome: Outcome::Completed,
            tasks_run: self.tasks.len(),
            cleanup,
        })
    }

    /// Run rollback tasks and delete every transient resource regardless of
    /// its flag.
    ///
    /// Rollback tasks run at most once. To drop files kept by a successful run
    /// without undoing anything, use [`Collection::release`].
    pub fn rollback(&mut self) -> CleanupReport {
        for mut task in std::mem::take(&mut self.rollback_tasks) {
            run_hook(&mut *task, "rollback");
        }
        self.finished = Some(Outcome::RolledBack);
        cleanup_pass(&mut self.tasks, Outcome::RolledBack)
    }

    /// Delete every transient resource regardless of its flag, without running
    /// any hooks. Safe to repeat.
    pub fn release(&mut self) -> CleanupReport {
        self.finished = Some(Outcome::Released);
        cleanup_pass(&mut self.tasks, Outcome::Released)
    }

    /// Run completion tasks and delete resources still flagged transient.
    pub fn complete(&mut self) -> CleanupReport {
        for mut task in std::mem::take(&mut self.completion_tasks) {
            run_hook(&mut *task, "completion");
        }
        self.finished = Some(Outcome::Completed);
        cleanup_pass(&mut self.tasks, Outcome::Completed)
    }
}

fn run_hook(task: &mut dyn Task, kind: &str) {
    let name = task.name();
    debug!(task = %name, kind, "running hook");
    if let Err(err) = task.run() {
        warn!(task = %name, kind, error = %format!("{err:#}"), "hook failed");
    }
}

fn cleanup_pass(tasks: &mut [Box<dyn Task>], outcome: Outcome) -> CleanupReport {
    let mut report = CleanupReport::default();
    for task in tasks {
        let Some(transient) = task.as_transient_mut() else {
            continue;
        };
        let path = transient.path().as_path().to_path_buf();
        if !should_clean(outcome, transient.is_transient()) {
            debug!(path = %path.display(), "retaining non-transient file");
            report.retain(path);
            continue;
        }
        match transient.cleanup_transients() {
            Ok(status) => report.record(path, status),
            Err(err) => {
                let message = format!("{err:#}");
                warn!(path = %path.display(), error = %message, "cleanup failed");
                report.fail(path, message);
            }
        }
    }
    info!(
        ?outcome,
        removed = report.removed.len(),
        retained = report.retained.len(),
        failures = report.failures.len(),
        "cleanup pass finished"
    );
    report
}
