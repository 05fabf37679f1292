//! Command-line interface for topology extension.
//!
//! The single `extend` command reads a topology file, resolves the external
//! legs from `meta.json` or explicit flags, extends every record and writes
//! the serialized result.

mod commands;
mod meta;

pub use commands::{
    Cli, CliError, Command, Eliminate, ExtendCommand, ExtendSummary, LegArgs, render_summary,
    run_cli,
};
pub use meta::{Particle, ProcessMeta, Side};

#[cfg(test)]
mod test_helpers;
