//! Temporary file task: a write whose path is known up front and whose file is
//! deleted by the owning collection.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use rand::Rng;
use tracing::{debug, warn};

use crate::core::path::{PathRequest, allocate};
use crate::core::types::{CleanupStatus, ResourcePath, TaskState};
use crate::io::config::TmpFileConfig;
use crate::io::write_task::WriteTask;
use crate::task::{Task, Transient};

/// Writes content to an allocated path and cleans it up with its collection.
///
/// The path is computed in the constructor, so it can be handed to other tasks
/// before this one runs:
///
/// ```no_run
/// use tmptask::io::tmp_file::TmpFileTask;
///
/// let task = TmpFileTask::new("notes", ".md", "", true).line("-----");
/// let path = task.path().clone();
/// ```
#[derive(Debug)]
pub struct TmpFileTask {
    path: ResourcePath,
    write: WriteTask,
    transient: bool,
    state: TaskState,
}

impl TmpFileTask {
    /// Allocate under `base` (the system temp directory when empty) using the
    /// thread-local random source.
    pub fn new(
        stem: impl Into<String>,
        extension: impl Into<String>,
        base: impl Into<PathBuf>,
        include_random: bool,
    ) -> Self {
        let request = PathRequest::new(stem, extension)
            .base(base)
            .include_random(include_random);
        Self::allocate(&request, &std::env::temp_dir(), &mut rand::thread_rng())
    }

    /// Allocate with an explicit temp directory and random source.
    pub fn allocate<R: Rng + ?Sized>(
        request: &PathRequest,
        temp_dir: &Path,
        rng: &mut R,
    ) -> Self {
        Self::at(allocate(request, temp_dir, rng))
    }

    /// Build from configuration, including its transience default.
    pub fn from_config(cfg: &TmpFileConfig) -> Self {
        Self::allocate(
            &cfg.path_request(),
            &std::env::temp_dir(),
            &mut rand::thread_rng(),
        )
        .transient(cfg.transient)
    }

    /// Wrap an already allocated path.
    pub fn at(path: ResourcePath) -> Self {
        debug!(path = %path, "allocated temp file path");
        Self {
            write: WriteTask::new(path.as_path()),
            path,
            transient: true,
            state: TaskState::Constructed,
        }
    }

    pub fn path(&self) -> &ResourcePath {
        &self.path
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    /// Builder form of [`Transient::set_transient`].
    pub fn transient(mut self, transient: bool) -> Self {
        self.update_transient(transient);
        self
    }

    pub fn line(self, line: impl Into<String>) -> Self {
        self.map_write(|write| write.line(line))
    }

    pub fn lines<I, S>(self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.map_write(|write| write.lines(lines))
    }

    pub fn text(self, text: impl Into<String>) -> Self {
        self.map_write(|write| write.text(text))
    }

    pub fn text_from_file(self, path: impl Into<PathBuf>) -> Self {
        self.map_write(|write| write.text_from_file(path))
    }

    pub fn place(self, name: &str, value: impl Into<String>) -> Self {
        self.map_write(|write| write.place(name, value))
    }

    pub fn replace(self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.map_write(|write| write.replace(from, to))
    }

    pub fn regex_replace(self, pattern: &str, to: impl Into<String>) -> Result<Self> {
        self.try_map_write(|write| write.regex_replace(pattern, to))
    }

    pub fn append_if_matches(self, pattern: &str, text: impl Into<String>) -> Result<Self> {
        self.try_map_write(|write| write.append_if_matches(pattern, text))
    }

    pub fn append_unless_matches(self, pattern: &str, text: impl Into<String>) -> Result<Self> {
        self.try_map_write(|write| write.append_unless_matches(pattern, text))
    }

    fn map_write(mut self, f: impl FnOnce(WriteTask) -> WriteTask) -> Self {
        self.write = f(self.write);
        self
    }

    fn try_map_write(mut self, f: impl FnOnce(WriteTask) -> Result<WriteTask>) -> Result<Self> {
        self.write = f(self.write)?;
        Ok(self)
    }

    fn update_transient(&mut self, transient: bool) {
        if self.state.cleaned_up() {
            warn!(path = %self.path, transient, "ignoring transience change after cleanup");
            return;
        }
        self.transient = transient;
    }
}

impl Task for TmpFileTask {
    fn name(&self) -> String {
        format!("tmp file {}", self.path)
    }

    fn run(&mut self) -> Result<()> {
        if self.state.cleaned_up() {
            bail!("temp file {} was already cleaned up", self.path);
        }
        self.write.write()?;
        self.state = TaskState::Executed;
        Ok(())
    }

    fn as_transient_mut(&mut self) -> Option<&mut dyn Transient> {
        Some(self)
    }
}

impl Transient for TmpFileTask {
    fn path(&self) -> &ResourcePath {
        &self.path
    }

    fn is_transient(&self) -> bool {
        self.transient
    }

    fn set_transient(&mut self, transient: bool) -> &mut dyn Transient {
        self.update_transient(transient);
        self
    }

    fn cleanup_transients(&mut self) -> Result<CleanupStatus> {
        if self.state.cleaned_up() {
            return Ok(CleanupStatus::AlreadyCleaned);
        }
        let executed = self.state.executed();
        let status = match fs::remove_file(self.path.as_path()) {
            Ok(()) => CleanupStatus::Removed,
            Err(err) if err.kind() == ErrorKind::NotFound => CleanupStatus::Absent,
            Err(err) => {
                return Err(err).with_context(|| format!("remove temp file {}", self.path));
            }
        };
        debug!(path = %self.path, ?status, executed, "temp file cleaned up");
        self.state = TaskState::Cleaned;
        Ok(status)
    }
}
