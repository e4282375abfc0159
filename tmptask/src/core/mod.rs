//! Deterministic, pure logic shared by the task lifecycle.
//!
//! Core modules must be free of I/O side effects. Randomness is injected by
//! the caller so results are reproducible in tests.

pub mod cleanup;
pub mod path;
pub mod types;
