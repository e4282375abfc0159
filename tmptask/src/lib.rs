//! Transient file tasks for ordered task pipelines.
//!
//! A [`io::tmp_file::TmpFileTask`] knows its path as soon as it is built,
//! writes its content when a [`collection::Collection`] runs it, and is deleted
//! when the collection finishes: always on rollback, and on normal completion
//! unless its transience flag was cleared.
//!
//! - **[`core`]**: Pure, deterministic logic (path allocation, cleanup
//!   eligibility). No I/O.
//! - **[`io`]**: Tasks that touch the filesystem, plus configuration.
//!
//! [`collection`] sequences tasks and drives cleanup through the
//! [`task::Transient`] capability.

pub mod collection;
pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod task;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
