//! Write accumulated content to a file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::Regex;
use tracing::debug;

use crate::io::atomic::write_atomic;
use crate::task::Task;

#[derive(Debug, Clone)]
enum WriteOp {
    Text(String),
    FromFile(PathBuf),
    Replace { from: String, to: String },
    RegexReplace { pattern: Regex, to: String },
    AppendIfMatches { pattern: Regex, text: String },
    AppendUnlessMatches { pattern: Regex, text: String },
}

/// Builds file content from a list of operations and writes it on [`run`].
///
/// Operations apply in the order they were added. Replacement operations see
/// only the content accumulated before them.
///
/// [`run`]: WriteTask::run
#[derive(Debug, Clone)]
pub struct WriteTask {
    path: PathBuf,
    ops: Vec<WriteOp>,
    append: bool,
}

impl WriteTask {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ops: Vec::new(),
            append: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Start from the existing file contents instead of an empty buffer.
    pub fn append(mut self, append: bool) -> Self {
        self.append = append;
        self
    }

    pub fn line(self, line: impl Into<String>) -> Self {
        let mut text = line.into();
        text.push('\n');
        self.text(text)
    }

    pub fn lines<I, S>(self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        lines.into_iter().fold(self, |task, line| task.line(line))
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.ops.push(WriteOp::Text(text.into()));
        self
    }

    /// Append the contents of another file, read when the task runs.
    pub fn text_from_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.ops.push(WriteOp::FromFile(path.into()));
        self
    }

    /// Replace `{name}` with `value`.
    pub fn place(self, name: &str, value: impl Into<String>) -> Self {
        self.replace(format!("{{{name}}}"), value)
    }

    pub fn replace(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.ops.push(WriteOp::Replace {
            from: from.into(),
            to: to.into(),
        });
        self
    }

    pub fn regex_replace(mut self, pattern: &str, to: impl Into<String>) -> Result<Self> {
        let pattern = compile(pattern)?;
        self.ops.push(WriteOp::RegexReplace {
            pattern,
            to: to.into(),
        });
        Ok(self)
    }

    /// Append `text` only if the content so far matches `pattern`.
    pub fn append_if_matches(mut self, pattern: &str, text: impl Into<String>) -> Result<Self> {
        let pattern = compile(pattern)?;
        self.ops.push(WriteOp::AppendIfMatches {
            pattern,
            text: text.into(),
        });
        Ok(self)
    }

    /// Append `text` only if the content so far does not match `pattern`.
    pub fn append_unless_matches(
        mut self,
        pattern: &str,
        text: impl Into<String>,
    ) -> Result<Self> {
        let pattern = compile(pattern)?;
        self.ops.push(WriteOp::AppendUnlessMatches {
            pattern,
            text: text.into(),
        });
        Ok(self)
    }

    /// Render the final file contents without writing anything.
    pub fn render(&self) -> Result<String> {
        let mut buf = if self.append {
            read_existing(&self.path)?
        } else {
            String::new()
        };
        for op in &self.ops {
            match op {
                WriteOp::Text(text) => buf.push_str(text),
                WriteOp::FromFile(path) => {
                    let contents = fs::read_to_string(path)
                        .with_context(|| format!("read {}", path.display()))?;
                    buf.push_str(&contents);
                }
                WriteOp::Replace { from, to } => buf = buf.replace(from.as_str(), to),
                WriteOp::RegexReplace { pattern, to } => {
                    buf = pattern.replace_all(&buf, to.as_str()).into_owned();
                }
                WriteOp::AppendIfMatches { pattern, text } => {
                    if pattern.is_match(&buf) {
                        buf.push_str(text);
                    }
                }
                WriteOp::AppendUnlessMatches { pattern, text } => {
                    if !pattern.is_match(&buf) {
                        buf.push_str(text);
                    }
                }
            }
        }
        Ok(buf)
    }

    /// Render and write the file (temp file + rename).
    ///
    /// Missing parent directories are not created.
    pub fn write(&self) -> Result<()> {
        let contents = self.render()?;
        debug!(path = %self.path.display(), bytes = contents.len(), "writing file");
        write_atomic(&self.path, &contents)
    }
}

impl Task for WriteTask {
    fn name(&self) -> String {
        format!("write {}", self.path.display())
    }

    fn run(&mut self) -> Result<()> {
        self.write()
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).with_context(|| format!("compile regex {pattern:?}"))
}

fn read_existing(path: &Path) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(contents),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
        Err(err) => Err(err).with_context(|| format!("read {}", path.display())),
    }
}
