//! Shared deterministic types for task lifecycle logic.
//!
//! These types define stable contracts between the pure core and the I/O
//! layer. They carry no handles to the filesystem.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A filesystem path fixed once at task construction.
///
/// There is no way to mutate a `ResourcePath` after it is built; tasks hand out
/// shared references or clones.
///
/// The path is absolute only when its base directory is. A relative base stays
/// relative, so writing and cleanup resolve it against the process working
/// directory at the time they run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourcePath(PathBuf);

impl ResourcePath {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}

impl AsRef<Path> for ResourcePath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Lifecycle position of a transient task.
///
/// `Cleaned` is terminal: nothing moves a task out of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    Constructed,
    Executed,
    Cleaned,
}

impl TaskState {
    pub fn executed(self) -> bool {
        matches!(self, TaskState::Executed)
    }

    pub fn cleaned_up(self) -> bool {
        matches!(self, TaskState::Cleaned)
    }
}

/// How a collection finished its run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Every task ran successfully.
    Completed,
    /// A task failed, or the caller rolled the collection back.
    RolledBack,
    /// The caller released every transient resource without undoing work.
    Released,
}

/// What a single cleanup invocation did on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanupStatus {
    /// The file existed and was deleted.
    Removed,
    /// The file was not there (never written, or removed by someone else).
    Absent,
    /// The task had already been cleaned; the filesystem was not touched.
    AlreadyCleaned,
}
