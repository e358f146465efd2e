//! Channel layer for pattern matching and PTY operations.
//!
//! This module handles the interactive session management,
//! including pattern-based prompt detection, pager handling
//! and ANSI stripping.

mod buffer;
mod pty;

pub use buffer::PatternBuffer;
pub use pty::{PtyChannel, Wire};

#[cfg(test)]
pub(crate) use pty::tests::ScriptedWire;
