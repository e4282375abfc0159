//! Test-only tasks and helpers for driving collections.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{Result, anyhow};

use crate::core::types::{CleanupStatus, ResourcePath};
use crate::io::tmp_file::TmpFileTask;
use crate::task::{Task, Transient};

/// Shared, ordered record of task names that ran.
pub type RunLog = Rc<RefCell<Vec<String>>>;

/// A task that always fails with `message`.
pub struct FailingTask {
    message: String,
}

impl FailingTask {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

impl Task for FailingTask {
    fn name(&self) -> String {
        format!("failing {}", self.message)
    }

    fn run(&mut self) -> Result<()> {
        Err(anyhow!("{}", self.message))
    }
}

/// A task that appends its name to a shared [`RunLog`] when run.
pub struct RecordingTask {
    name: String,
    log: RunLog,
}

impl RecordingTask {
    pub fn log() -> RunLog {
        Rc::new(RefCell::new(Vec::new()))
    }

    pub fn new(name: &str, log: &RunLog) -> Self {
        Self {
            name: name.to_string(),
            log: Rc::clone(log),
        }
    }
}

impl Task for RecordingTask {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn run(&mut self) -> Result<()> {
        self.log.borrow_mut().push(self.name.clone());
        Ok(())
    }
}

/// A transient resource whose cleanup always fails, as if the file were
/// undeletable.
pub struct StuckTransient {
    path: ResourcePath,
    transient: bool,
}

impl StuckTransient {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: ResourcePath::new(path.into()),
            transient: true,
        }
    }
}

impl Task for StuckTransient {
    fn name(&self) -> String {
        format!("stuck {}", self.path)
    }

    fn run(&mut self) -> Result<()> {
        Ok(())
    }

    fn as_transient_mut(&mut self) -> Option<&mut dyn Transient> {
        Some(self)
    }
}

impl Transient for StuckTransient {
    fn path(&self) -> &ResourcePath {
        &self.path
    }

    fn is_transient(&self) -> bool {
        self.transient
    }

    fn set_transient(&mut self, transient: bool) -> &mut dyn Transient {
        self.transient = transient;
        self
    }

    fn cleanup_transients(&mut self) -> Result<CleanupStatus> {
        Err(anyhow!("remove temp file {}: permission denied", self.path))
    }
}

/// Transient temp file under `dir` named exactly `stem`, with one line of
/// content.
pub fn scratch_task(dir: &Path, stem: &str) -> TmpFileTask {
    TmpFileTask::new(stem, "", dir, false).line(stem)
}

/// Fresh temporary directory removed on drop.
pub fn scratch_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("tempdir")
}
