//! Task and transient-resource contracts used by [`crate::collection`].

use anyhow::Result;

use crate::core::types::{CleanupStatus, ResourcePath};

/// A unit of work a collection can run.
pub trait Task {
    /// Short label used in logs and error context.
    fn name(&self) -> String;

    fn run(&mut self) -> Result<()>;

    /// Expose the transient capability, if this task owns a cleanable resource.
    fn as_transient_mut(&mut self) -> Option<&mut dyn Transient> {
        None
    }
}

/// A task whose on-disk resource is deleted by the collection's cleanup pass.
pub trait Transient {
    /// Path fixed at construction; valid before the task has run.
    fn path(&self) -> &ResourcePath;

    /// Whether normal completion deletes the resource. Rollback ignores this.
    fn is_transient(&self) -> bool;

    /// Change the transience flag. Returns the task for chaining.
    fn set_transient(&mut self, transient: bool) -> &mut dyn Transient;

    /// Delete the resource.
    ///
    /// A missing file counts as clean. Repeated calls are no-ops. Any other
    /// failure is returned so the caller can record it and keep going.
    fn cleanup_transients(&mut self) -> Result<CleanupStatus>;
}
