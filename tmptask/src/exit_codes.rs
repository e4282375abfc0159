//! Stable exit codes for the `tmptask` binary.

/// Command succeeded.
pub const OK: i32 = 0;
/// Invalid arguments or config, or another error before any task ran.
pub const INVALID: i32 = 1;
/// A task failed and the collection rolled back.
pub const ROLLED_BACK: i32 = 2;
