//! Support library for the `looptopo` binary.
//!
//! Exposes the command pipeline and logging set-up so doctests and unit tests
//! can drive the CLI without spawning a subprocess.

pub mod cli;
pub mod logging;
