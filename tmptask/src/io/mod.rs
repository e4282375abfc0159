//! Filesystem-facing tasks and configuration.

pub mod atomic;
pub mod config;
pub mod tmp_file;
pub mod write_task;
