//! Small helpers shared across CLI tests.

use std::fs;
use std::io;
use std::path::PathBuf;

use tempfile::TempDir;

use super::{CliError, ExtendCommand, LegArgs};
use super::commands::run_extend;

pub(super) fn temp_dir() -> TempDir {
    match TempDir::new() {
        Ok(dir) => dir,
        Err(err) => panic!("failed to create temp dir: {err}"),
    }
}

pub(super) fn create_file(dir: &TempDir, name: &str, contents: &str) -> io::Result<PathBuf> {
    let path = dir.path().join(name);
    fs::write(&path, contents)?;
    Ok(path)
}

/// An `extend` command over four legs with every flag at its default.
pub(super) fn extend_command(topologies: PathBuf) -> ExtendCommand {
    ExtendCommand {
        topologies,
        legs: LegArgs {
            legs: std::num::NonZeroUsize::new(4),
            ..LegArgs::default()
        },
        basis_prefix: "p".to_owned(),
        loop_symbol: "l".to_owned(),
        target: None,
        rank_needed: None,
        eliminate: super::Eliminate::Last,
        max_add: 50,
        default_mass: "0".to_owned(),
        output: None,
        var_name: "Extended".to_owned(),
    }
}

pub(super) fn run_extend_expecting_error(cmd: ExtendCommand, panic_msg: &str) -> CliError {
    match run_extend(cmd) {
        Ok(_) => panic!("{panic_msg}"),
        Err(err) => err,
    }
}
